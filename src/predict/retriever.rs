use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sgp4::Constants;

use crate::overhead::{Facility, PositionTime, Satellite};
use crate::predict::cache::GeometryCache;
use crate::predict::propagation::topocentric_position;
use crate::predict::PredictError;

/// Source of satellite look angles relative to a facility.
pub trait PositionRetriever: Send + Sync {
    /// One sample per instant, in the order the instants were given.
    fn positions(
        &self,
        facility: &Facility,
        satellite: &Satellite,
        datetimes: &[DateTime<Utc>],
    ) -> Result<Vec<PositionTime>, PredictError>;

    fn position(
        &self,
        satellite: &Satellite,
        timestamp: DateTime<Utc>,
        facility: &Facility,
    ) -> Result<PositionTime, PredictError> {
        self.positions(facility, satellite, &[timestamp])?
            .pop()
            .ok_or_else(|| PredictError::MissingSample {
                satellite: satellite.name.clone(),
                time: timestamp,
            })
    }
}

/// Propagates TLE elements with SGP4.
#[derive(Debug, Default)]
pub struct Sgp4Retriever {
    cache: GeometryCache,
}

impl Sgp4Retriever {
    pub fn new(cache: GeometryCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }
}

impl PositionRetriever for Sgp4Retriever {
    fn positions(
        &self,
        facility: &Facility,
        satellite: &Satellite,
        datetimes: &[DateTime<Utc>],
    ) -> Result<Vec<PositionTime>, PredictError> {
        let elements = satellite
            .elements()
            .ok_or_else(|| PredictError::MissingElements(satellite.name.clone()))?;
        let constants = Constants::from_elements(elements)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let frame = self.cache.facility_frame(facility);

        datetimes
            .iter()
            .map(|&time| {
                topocentric_position(&frame, elements, &constants, time)
                    .map(|position| PositionTime::new(position, time))
            })
            .collect()
    }
}

/// Serves precomputed samples, keyed by satellite name.
#[derive(Debug, Clone, Default)]
pub struct TabulatedPositions {
    tables: HashMap<String, BTreeMap<DateTime<Utc>, PositionTime>>,
}

impl TabulatedPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, satellite: &str, samples: impl IntoIterator<Item = PositionTime>) {
        let table = self.tables.entry(satellite.to_string()).or_default();
        for sample in samples {
            table.insert(sample.time, sample);
        }
    }

    pub fn with(mut self, satellite: &str, samples: impl IntoIterator<Item = PositionTime>) -> Self {
        self.insert(satellite, samples);
        self
    }
}

impl PositionRetriever for TabulatedPositions {
    fn positions(
        &self,
        _facility: &Facility,
        satellite: &Satellite,
        datetimes: &[DateTime<Utc>],
    ) -> Result<Vec<PositionTime>, PredictError> {
        let table = self.tables.get(&satellite.name);
        datetimes
            .iter()
            .map(|&time| {
                table
                    .and_then(|t| t.get(&time))
                    .copied()
                    .ok_or_else(|| PredictError::MissingSample {
                        satellite: satellite.name.clone(),
                        time,
                    })
            })
            .collect()
    }
}
