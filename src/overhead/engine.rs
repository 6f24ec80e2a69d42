use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::antenna_path::{pair_with_antenna_path, validate_antenna_path};
use super::coordinator::Coordinator;
use super::error::{ConfigurationError, EngineError};
use super::filter::{AboveHorizonFilter, FilterStrategy, WithinMainBeamFilter};
use super::power::{accumulate_power, PowerAggregator};
use super::settings::{OnFail, RuntimeSettings};
use super::time_sampler::sample_times;
use super::types::{OverheadWindow, PositionTime, PowerWindow, Reservation, Satellite};
use super::window_builder::{InViewRun, WindowBuilder};
use crate::gain::{ConstantGain, GainPattern};
use crate::predict::PositionRetriever;

/// Finds when satellites are overhead of, or inside the beam of, a facility
/// during one reservation.
pub struct OverheadEngine<R> {
    reservation: Reservation,
    satellites: Vec<Satellite>,
    antenna_path: Vec<PositionTime>,
    settings: RuntimeSettings,
    retriever: R,
    gain: Arc<dyn GainPattern>,
    cutoff: DateTime<Utc>,
    sample_times: Vec<DateTime<Utc>>,
    coordinator: Coordinator,
}

/// Received power per satellite, and the sum over all satellites per second
/// of the reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSeries {
    pub windows: Vec<PowerWindow>,
    pub per_second: Vec<f64>,
}

impl<R: PositionRetriever> OverheadEngine<R> {
    pub fn new(
        reservation: Reservation,
        satellites: Vec<Satellite>,
        antenna_path: Vec<PositionTime>,
        settings: RuntimeSettings,
        retriever: R,
    ) -> Result<Self, EngineError> {
        if satellites.is_empty() {
            return Err(ConfigurationError::NoSatellites.into());
        }
        validate_antenna_path(&antenna_path)?;
        reservation.validate()?;
        settings.validate()?;

        let sample_times = sample_times(&reservation.time, settings.time_continuity_resolution)?;
        let coordinator = Coordinator::new(settings.concurrency_level)?;

        Ok(Self {
            cutoff: reservation.time.end(),
            reservation,
            satellites,
            antenna_path,
            settings,
            retriever,
            gain: Arc::new(ConstantGain::isotropic()),
            sample_times,
            coordinator,
        })
    }

    /// Stop considering samples at `cutoff` instead of the reservation end.
    pub fn with_cutoff(mut self, cutoff: DateTime<Utc>) -> Result<Self, EngineError> {
        let time = &self.reservation.time;
        if cutoff <= time.begin() || cutoff > time.end() {
            return Err(ConfigurationError::Cutoff { cutoff }.into());
        }
        self.cutoff = cutoff;
        Ok(self)
    }

    /// Receive pattern used by the power entry points. Isotropic by default.
    pub fn with_gain_pattern(mut self, gain: Arc<dyn GainPattern>) -> Self {
        self.gain = gain;
        self
    }

    pub fn reservation(&self) -> &Reservation {
        &self.reservation
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn get_satellites_above_horizon(&self) -> Result<Vec<OverheadWindow>, EngineError> {
        let filter = AboveHorizonFilter::new(self.settings.min_altitude_deg);
        self.overhead_windows(&filter)
    }

    pub fn get_satellites_crossing_main_beam(&self) -> Result<Vec<OverheadWindow>, EngineError> {
        let filter =
            WithinMainBeamFilter::new(&self.reservation.facility, self.settings.min_altitude_deg);
        self.overhead_windows(&filter)
    }

    /// Power from every satellite above the horizon. Sidelobes are covered by
    /// the gain pattern, so this does not restrict to the main beam.
    pub fn get_satellite_power(&self) -> Result<Vec<PowerWindow>, EngineError> {
        let filter = AboveHorizonFilter::new(self.settings.min_altitude_deg);
        self.satellite_power(&filter)
    }

    pub fn get_satellite_power_series(&self) -> Result<PowerSeries, EngineError> {
        let windows = self.get_satellite_power()?;
        let seconds = (self.reservation.time.duration().num_milliseconds() + 999) / 1000;
        let mut per_second = vec![0.0; seconds as usize];
        accumulate_power(&windows, self.reservation.time.begin(), &mut per_second);
        Ok(PowerSeries {
            windows,
            per_second,
        })
    }

    pub fn overhead_windows(
        &self,
        filter: &dyn FilterStrategy,
    ) -> Result<Vec<OverheadWindow>, EngineError> {
        log::info!(
            "Searching {} satellites over {} samples with {} workers (on_fail: {})",
            self.satellites.len(),
            self.sample_times.len(),
            self.coordinator.num_threads(),
            self.settings.on_fail
        );

        let results = self.coordinator.run(&self.satellites, |satellite| {
            let runs = self.in_view_runs(satellite, filter)?;
            log::debug!("{}: {} windows", satellite.name, runs.len());
            Ok::<_, EngineError>(
                runs.into_iter()
                    .map(|run| OverheadWindow {
                        satellite: satellite.clone(),
                        overhead_time: run.window,
                        positions: run.positions(),
                    })
                    .collect::<Vec<_>>(),
            )
        });

        self.collect(results)
    }

    pub fn satellite_power(
        &self,
        filter: &dyn FilterStrategy,
    ) -> Result<Vec<PowerWindow>, EngineError> {
        let frequency_hz = self
            .reservation
            .frequency
            .frequency_hz
            .ok_or(ConfigurationError::MissingFrequency)?;
        let aggregator =
            PowerAggregator::new(&self.reservation.facility, self.gain.as_ref(), frequency_hz);

        log::info!(
            "Estimating power from {} satellites at {} Hz",
            self.satellites.len(),
            frequency_hz
        );

        let results = self.coordinator.run(&self.satellites, |satellite| {
            let runs = self.in_view_runs(satellite, filter)?;
            let powertimes = aggregator.powertimes(satellite, &runs)?;
            let windows = if powertimes.is_empty() {
                Vec::new()
            } else {
                vec![PowerWindow {
                    satellite: satellite.clone(),
                    powertimes,
                }]
            };
            Ok::<_, EngineError>(windows)
        });

        self.collect(results)
    }

    fn in_view_runs(
        &self,
        satellite: &Satellite,
        filter: &dyn FilterStrategy,
    ) -> Result<Vec<InViewRun>, EngineError> {
        let positions = self
            .retriever
            .positions(&self.reservation.facility, satellite, &self.sample_times)
            .map_err(|source| EngineError::Satellite {
                satellite: satellite.name.clone(),
                source,
            })?;
        let pairings =
            pair_with_antenna_path(&positions, &self.antenna_path, self.reservation.time.end());
        Ok(WindowBuilder::new(filter, self.cutoff).build(pairings))
    }

    fn collect<T>(
        &self,
        results: Vec<Result<Vec<T>, EngineError>>,
    ) -> Result<Vec<T>, EngineError> {
        let mut collected = Vec::new();
        for (satellite, result) in self.satellites.iter().zip(results) {
            match result {
                Ok(items) => collected.extend(items),
                Err(e) => match self.settings.on_fail {
                    OnFail::Abort => return Err(e),
                    OnFail::Continue => {
                        log::warn!("Skipping satellite {}: {}", satellite.name, e);
                    }
                },
            }
        }
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overhead::facility::{Coordinates, Facility};
    use crate::overhead::types::{Position, TimeWindow};
    use crate::predict::TabulatedPositions;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn reservation() -> Reservation {
        Reservation {
            facility: Facility::new("dish", Coordinates::default(), 0.0, 3.0),
            time: TimeWindow::new(at(0), at(5)).unwrap(),
            frequency: Default::default(),
        }
    }

    fn settings() -> RuntimeSettings {
        RuntimeSettings {
            time_continuity_resolution: Duration::minutes(1),
            ..Default::default()
        }
    }

    fn path() -> Vec<PositionTime> {
        vec![PositionTime::new(Position::new(45.0, 90.0), at(0))]
    }

    fn engine(
        satellites: Vec<Satellite>,
        retriever: TabulatedPositions,
    ) -> Result<OverheadEngine<TabulatedPositions>, EngineError> {
        OverheadEngine::new(reservation(), satellites, path(), settings(), retriever)
    }

    fn config_field(
        result: Result<OverheadEngine<TabulatedPositions>, EngineError>,
    ) -> &'static str {
        match result {
            Err(EngineError::Configuration(e)) => e.field(),
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn validation_names_the_field() {
        let sat = || vec![Satellite::named("a")];
        let none = TabulatedPositions::new;

        assert_eq!(config_field(engine(vec![], none())), "satellites");
        assert_eq!(
            config_field(OverheadEngine::new(reservation(), sat(), vec![], settings(), none())),
            "antenna_direction_path"
        );

        let mut flat = reservation();
        flat.facility.beamwidth_deg = -1.0;
        assert_eq!(
            config_field(OverheadEngine::new(flat, sat(), path(), settings(), none())),
            "facility.beamwidth"
        );

        let mut empty = reservation();
        empty.time = TimeWindow::new(at(1), at(1)).unwrap();
        assert_eq!(
            config_field(OverheadEngine::new(empty, sat(), path(), settings(), none())),
            "reservation.time"
        );

        let fast = RuntimeSettings {
            time_continuity_resolution: Duration::zero(),
            ..settings()
        };
        assert_eq!(
            config_field(OverheadEngine::new(reservation(), sat(), path(), fast, none())),
            "time_continuity_resolution"
        );
    }

    #[test]
    fn cutoff_must_be_inside_reservation() {
        let engine = engine(vec![Satellite::named("a")], TabulatedPositions::new()).unwrap();
        assert_eq!(engine.cutoff(), at(5));
        assert!(matches!(
            engine.with_cutoff(at(6)),
            Err(EngineError::Configuration(ConfigurationError::Cutoff { .. }))
        ));
    }

    #[test]
    fn power_requires_frequency_before_any_work() {
        let engine = engine(vec![Satellite::named("a")], TabulatedPositions::new()).unwrap();
        assert!(matches!(
            engine.get_satellite_power(),
            Err(EngineError::Configuration(ConfigurationError::MissingFrequency))
        ));
    }

    #[test]
    fn non_positive_frequency_rejected_up_front() {
        for frequency_hz in [0.0, -1.42e9, f64::NAN] {
            let mut tuned = reservation();
            tuned.frequency.frequency_hz = Some(frequency_hz);
            let result = OverheadEngine::new(
                tuned,
                vec![Satellite::named("a")],
                path(),
                settings(),
                TabulatedPositions::new(),
            );
            assert_eq!(config_field(result), "reservation.frequency");
        }
    }

    #[test]
    fn on_fail_policy() {
        let good = TabulatedPositions::new().with(
            "good",
            (0..5).map(|m| PositionTime::new(Position::new(10.0, 0.0), at(m))),
        );
        let satellites = vec![Satellite::named("missing"), Satellite::named("good")];

        let aborting = engine(satellites.clone(), good.clone()).unwrap();
        assert!(matches!(
            aborting.get_satellites_above_horizon(),
            Err(EngineError::Satellite { satellite, .. }) if satellite == "missing"
        ));

        let continuing = OverheadEngine::new(
            reservation(),
            satellites,
            path(),
            RuntimeSettings {
                on_fail: OnFail::Continue,
                ..settings()
            },
            good,
        )
        .unwrap();
        let windows = continuing.get_satellites_above_horizon().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].satellite.name, "good");
        assert_eq!(windows[0].overhead_time, TimeWindow::new(at(0), at(5)).unwrap());
        assert_eq!(windows[0].positions.len(), 5);
    }
}
