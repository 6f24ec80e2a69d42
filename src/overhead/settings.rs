use chrono::Duration;
use serde::Deserialize;
use strum_macros::Display;

use super::error::ConfigurationError;

/// What to do with a satellite whose geometry could not be computed.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OnFail {
    /// Fail the whole run with the first satellite error.
    #[default]
    Abort,
    /// Log the error and leave the satellite out of the results.
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub time_continuity_resolution: Duration,
    pub concurrency_level: usize,
    pub min_altitude_deg: f64,
    pub on_fail: OnFail,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            time_continuity_resolution: Duration::seconds(1),
            concurrency_level: 1,
            min_altitude_deg: 0.0,
            on_fail: OnFail::Abort,
        }
    }
}

impl RuntimeSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.time_continuity_resolution < Duration::seconds(1) {
            return Err(ConfigurationError::Resolution(
                self.time_continuity_resolution,
            ));
        }
        if self.concurrency_level < 1 {
            return Err(ConfigurationError::ConcurrencyLevel(self.concurrency_level));
        }
        if !(self.min_altitude_deg >= 0.0) {
            return Err(ConfigurationError::MinAltitude(self.min_altitude_deg));
        }
        Ok(())
    }
}
