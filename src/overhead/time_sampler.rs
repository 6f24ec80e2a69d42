use chrono::{DateTime, Duration, Utc};

use super::error::ConfigurationError;
use super::types::TimeWindow;

/// Evenly spaced instants `begin, begin + r, ...` strictly before `end`.
///
/// Cloning the sampler restarts the sequence from `begin`.
#[derive(Debug, Clone)]
pub struct TimeSampler {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    resolution: Duration,
}

impl TimeSampler {
    pub fn new(window: &TimeWindow, resolution: Duration) -> Result<Self, ConfigurationError> {
        if resolution < Duration::seconds(1) {
            return Err(ConfigurationError::Resolution(resolution));
        }
        Ok(Self {
            cursor: window.begin(),
            end: window.end(),
            resolution,
        })
    }
}

impl Iterator for TimeSampler {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let current = self.cursor;
        // Past chrono's range means past `end`
        self.cursor = self
            .cursor
            .checked_add_signed(self.resolution)
            .unwrap_or(self.end);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cursor >= self.end {
            return (0, Some(0));
        }
        let span = (self.end - self.cursor).num_milliseconds();
        let step = self.resolution.num_milliseconds();
        let remaining = (span / step + i64::from(span % step != 0)) as usize;
        (remaining, Some(remaining))
    }
}

/// Sample instants for a window at the given resolution.
pub fn sample_times(
    window: &TimeWindow,
    resolution: Duration,
) -> Result<Vec<DateTime<Utc>>, ConfigurationError> {
    Ok(TimeSampler::new(window, resolution)?.collect())
}
