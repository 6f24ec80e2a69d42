//! Receive-antenna gain patterns.
//!
//! Angles are in the antenna frame: `theta` is the angle away from boresight
//! and `phi` the angle around it. Gains are linear, not dB.

use std::f64::consts::LN_2;

pub trait GainPattern: Send + Sync {
    fn get_gain(&self, theta_deg: f64, phi_deg: f64) -> f64;
}

pub fn dbi_to_linear(dbi: f64) -> f64 {
    10f64.powf(dbi / 10.0)
}

fn normalize_phi(phi_deg: f64) -> f64 {
    phi_deg.rem_euclid(360.0)
}

/// Same gain in every direction.
#[derive(Debug, Clone, Copy)]
pub struct ConstantGain {
    gain: f64,
}

impl ConstantGain {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }

    pub fn from_dbi(dbi: f64) -> Self {
        Self::new(dbi_to_linear(dbi))
    }

    pub fn isotropic() -> Self {
        Self::new(1.0)
    }
}

impl GainPattern for ConstantGain {
    fn get_gain(&self, _theta_deg: f64, _phi_deg: f64) -> f64 {
        self.gain
    }
}

/// Gaussian main beam, `G(θ) = G0 · exp(-4 ln2 · (θ / FWHM(φ))²)`.
///
/// The beam may be elliptical: `fwhm_x_deg` applies along `φ = 0` and
/// `fwhm_y_deg` along `φ = 90`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBeam {
    peak_gain: f64,
    fwhm_x_deg: f64,
    fwhm_y_deg: f64,
}

impl GaussianBeam {
    pub fn new(peak_gain: f64, fwhm_deg: f64) -> Self {
        Self::elliptical(peak_gain, fwhm_deg, fwhm_deg)
    }

    pub fn elliptical(peak_gain: f64, fwhm_x_deg: f64, fwhm_y_deg: f64) -> Self {
        Self {
            peak_gain,
            fwhm_x_deg,
            fwhm_y_deg,
        }
    }

    pub fn from_dbi(peak_gain_dbi: f64, fwhm_deg: f64) -> Self {
        Self::new(dbi_to_linear(peak_gain_dbi), fwhm_deg)
    }

    fn fwhm_at(&self, phi_deg: f64) -> f64 {
        let phi = normalize_phi(phi_deg).to_radians();
        let (sin, cos) = phi.sin_cos();
        let inv_sq = (cos / self.fwhm_x_deg).powi(2) + (sin / self.fwhm_y_deg).powi(2);
        inv_sq.sqrt().recip()
    }
}

impl GainPattern for GaussianBeam {
    fn get_gain(&self, theta_deg: f64, phi_deg: f64) -> f64 {
        let x = theta_deg / self.fwhm_at(phi_deg);
        self.peak_gain * (-4.0 * LN_2 * x * x).exp()
    }
}
