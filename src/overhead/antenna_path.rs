use chrono::{DateTime, Utc};

use super::error::ConfigurationError;
use super::types::{AntennaPosition, PositionTime};

/// Checks that the pointing schedule is non-empty and strictly increasing.
pub fn validate_antenna_path(path: &[PositionTime]) -> Result<(), ConfigurationError> {
    if path.is_empty() {
        return Err(ConfigurationError::EmptyAntennaPath);
    }
    for (index, pair) in path.windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            return Err(ConfigurationError::NonMonotonicAntennaPath { index: index + 1 });
        }
    }
    Ok(())
}

/// Splits a satellite's samples across the antenna pointing intervals.
///
/// Interval `i` covers `[path[i].time, path[i + 1].time)`; the last interval
/// runs until `path_end`. Samples before the first pointing are dropped.
pub fn pair_with_antenna_path(
    satellite_positions: &[PositionTime],
    antenna_path: &[PositionTime],
    path_end: DateTime<Utc>,
) -> Vec<AntennaPosition> {
    let mut path = antenna_path.to_vec();
    path.sort_by_key(|p| p.time);

    path.iter()
        .enumerate()
        .map(|(i, direction)| {
            let interval_end = path.get(i + 1).map(|next| next.time).unwrap_or(path_end);
            AntennaPosition {
                satellite_positions: satellite_positions
                    .iter()
                    .filter(|p| direction.time <= p.time && p.time < interval_end)
                    .copied()
                    .collect(),
                antenna_direction: *direction,
            }
        })
        .collect()
}
