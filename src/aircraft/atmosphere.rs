//! International Standard Atmosphere, troposphere and lower stratosphere.
//!
//!   T(h) = T0 - 0.0065 h + dISA                      h <= 11 km
//!   P(h) = P0 (1 - 0.0065 h / T0)^(g / (R 0.0065))
//!   P(h) = P11 exp(-g (h - 11000) / (R T11))          h >  11 km

pub const G: f64 = 9.80665;
pub const R_AIR: f64 = 287.053;
pub const GAMMA: f64 = 1.4;
pub const P0: f64 = 101_325.0;
pub const T0: f64 = 288.15;
pub const RHO0: f64 = P0 / (R_AIR * T0);

const LAPSE: f64 = 0.0065;
const TROPOPAUSE: f64 = 11_000.0;

/// Static pressure (Pa), temperature (K), density (kg/m3) and speed of sound
/// (m/s) at pressure altitude `altp` with temperature shift `disa`.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    pub pamb: f64,
    pub tamb: f64,
    pub rho: f64,
    pub vsnd: f64,
}

impl Atmosphere {
    pub fn at(altp: f64, disa: f64) -> Self {
        let h = altp.min(20_000.0);
        let t11 = T0 - LAPSE * TROPOPAUSE;
        let (pamb, tstd) = if h <= TROPOPAUSE {
            let t = T0 - LAPSE * h;
            (P0 * (t / T0).powf(G / (R_AIR * LAPSE)), t)
        } else {
            let p11 = P0 * (t11 / T0).powf(G / (R_AIR * LAPSE));
            (p11 * (-G * (h - TROPOPAUSE) / (R_AIR * t11)).exp(), t11)
        };
        let tamb = tstd + disa;
        Self {
            pamb,
            tamb,
            rho: pamb / (R_AIR * tamb),
            vsnd: (GAMMA * R_AIR * tamb).sqrt(),
        }
    }

    /// Density ratio to sea level standard.
    pub fn sigma(&self) -> f64 {
        self.rho / RHO0
    }

    /// Dynamic pressure at `mach`.
    pub fn dynamic_pressure(&self, mach: f64) -> f64 {
        0.5 * GAMMA * self.pamb * mach * mach
    }

    /// True air speed from calibrated air speed (equivalent air speed
    /// approximation).
    pub fn tas_from_cas(&self, cas: f64) -> f64 {
        cas / self.sigma().sqrt()
    }
}
