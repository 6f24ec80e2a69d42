//! Free-space link budget for satellites inside the antenna's view.
//!
//! `P = P_tx · G_tx · G_rx / L_fs` with `L_fs = (4π·d/λ)²` and `λ = c / f`.
//! `G_rx` comes from the facility's gain pattern, looked up at the
//! satellite's angles in the antenna frame (boresight along +z, `φ = 0`
//! toward rising altitude).

use std::f64::consts::PI;

use chrono::{DateTime, Utc};

use super::error::EngineError;
use super::facility::Facility;
use super::types::{Position, PowerTime, PowerWindow, Satellite, Transmitter};
use super::window_builder::InViewRun;
use crate::gain::GainPattern;
use crate::predict::enu_to_ecef;

pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

pub fn wavelength_m(frequency_hz: f64) -> f64 {
    SPEED_OF_LIGHT_M_S / frequency_hz
}

pub fn free_space_path_loss(distance_m: f64, wavelength_m: f64) -> f64 {
    (4.0 * PI * distance_m / wavelength_m).powi(2)
}

pub fn received_power_watts(
    transmitter: &Transmitter,
    receive_gain: f64,
    distance_km: f64,
    frequency_hz: f64,
) -> f64 {
    let loss = free_space_path_loss(distance_km * 1000.0, wavelength_m(frequency_hz));
    transmitter.power_watts * transmitter.gain * receive_gain / loss
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalized(v: [f64; 3]) -> Option<[f64; 3]> {
    let norm = dot(v, v).sqrt();
    (norm > 1e-12).then(|| [v[0] / norm, v[1] / norm, v[2] / norm])
}

fn reject(v: [f64; 3], axis: [f64; 3]) -> [f64; 3] {
    let d = dot(v, axis);
    [v[0] - d * axis[0], v[1] - d * axis[1], v[2] - d * axis[2]]
}

/// Unit look vector in the Earth-fixed frame.
fn look_vector(position: &Position, lat_rad: f64, lon_rad: f64) -> [f64; 3] {
    let alt = position.altitude_deg.to_radians();
    let az = position.azimuth_deg.to_radians();
    let enu = (alt.cos() * az.sin(), alt.cos() * az.cos(), alt.sin());
    enu_to_ecef(enu, lat_rad, lon_rad)
}

/// `(theta, phi)` of the satellite in the antenna frame, in degrees.
pub fn antenna_frame_angles(
    facility: &Facility,
    satellite: &Position,
    antenna: &Position,
) -> (f64, f64) {
    let lat = facility.coordinates.lat_rad();
    let lon = facility.coordinates.lon_rad();

    let boresight = look_vector(antenna, lat, lon);
    let target = look_vector(satellite, lat, lon);
    let zenith = enu_to_ecef((0.0, 0.0, 1.0), lat, lon);
    let north = enu_to_ecef((0.0, 1.0, 0.0), lat, lon);

    // Pointing at zenith leaves "up" undefined; fall back to north
    let x_axis = normalized(reject(zenith, boresight))
        .or_else(|| normalized(reject(north, boresight)))
        .unwrap_or(north);
    let y_axis = cross(boresight, x_axis);

    let theta = dot(target, boresight).clamp(-1.0, 1.0).acos().to_degrees();
    let phi = dot(target, y_axis)
        .atan2(dot(target, x_axis))
        .to_degrees()
        .rem_euclid(360.0);
    (theta, phi)
}

pub struct PowerAggregator<'a> {
    facility: &'a Facility,
    gain: &'a dyn GainPattern,
    frequency_hz: f64,
}

impl<'a> PowerAggregator<'a> {
    pub fn new(facility: &'a Facility, gain: &'a dyn GainPattern, frequency_hz: f64) -> Self {
        Self {
            facility,
            gain,
            frequency_hz,
        }
    }

    /// Received power for every in-view sample, in time order.
    pub fn powertimes(
        &self,
        satellite: &Satellite,
        runs: &[InViewRun],
    ) -> Result<Vec<PowerTime>, EngineError> {
        let transmitter = satellite.transmitter.unwrap_or_default();
        runs.iter()
            .flat_map(|run| run.samples.iter())
            .map(|sample| {
                let position = &sample.position.position;
                let distance_km =
                    position
                        .distance_km
                        .ok_or_else(|| EngineError::MissingDistance {
                            satellite: satellite.name.clone(),
                            time: sample.position.time,
                        })?;
                let (theta, phi) =
                    antenna_frame_angles(self.facility, position, &sample.antenna_direction);
                let receive_gain = self.gain.get_gain(theta, phi);
                Ok(PowerTime {
                    power_watts: received_power_watts(
                        &transmitter,
                        receive_gain,
                        distance_km,
                        self.frequency_hz,
                    ),
                    time: sample.position.time,
                })
            })
            .collect()
    }
}

/// Adds each power sample into the one-second bucket
/// `floor(time - start)`. Samples outside the buckets are ignored.
pub fn accumulate_power(windows: &[PowerWindow], start: DateTime<Utc>, buckets: &mut [f64]) {
    for powertime in windows.iter().flat_map(|w| w.powertimes.iter()) {
        let offset_ms = (powertime.time - start).num_milliseconds();
        if offset_ms < 0 {
            continue;
        }
        if let Some(bucket) = buckets.get_mut((offset_ms / 1000) as usize) {
            *bucket += powertime.power_watts;
        }
    }
}
