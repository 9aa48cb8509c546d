//! Non-structural subsystems: propulsion, aerodynamics, weights, economics and
//! environment.

use super::atmosphere::Atmosphere;

/// Engine ratings as a fraction of the flat-rated take-off thrust.
pub const MTO: f64 = 1.0;
pub const MCN: f64 = 0.86;
pub const MCL: f64 = 0.80;
pub const MCR: f64 = 0.70;

/// Turbofan engines.
///
/// Available thrust lapses with density and Mach:
///   F = n * F_ref * rating * sigma^0.85 * (1 - 0.3 M)
#[derive(Debug, Clone)]
pub struct PowerSystem {
    /// Sea level static thrust of one engine, N (design variable)
    pub reference_thrust: f64,
    pub n_engine: f64,
    /// Technology factor on specific consumption (0.99 to 1.03)
    pub sfc_correction: f64,
    /// Cruise specific fuel consumption, kg/N/s
    pub tsfc_crz: f64,
    /// Thrust available at cruise, MCR rating, N
    pub crz_thrust: f64,
}

impl Default for PowerSystem {
    fn default() -> Self {
        Self {
            reference_thrust: 121_000.0,
            n_engine: 2.0,
            sfc_correction: 1.0,
            tsfc_crz: 0.0,
            crz_thrust: 0.0,
        }
    }
}

impl PowerSystem {
    /// Total thrust available from all running engines.
    pub fn thrust(&self, atm: &Atmosphere, mach: f64, rating: f64) -> f64 {
        self.n_engine * self.reference_thrust * rating * atm.sigma().powf(0.85) * (1.0 - 0.3 * mach)
    }
}

/// Drag polar:
///   Cx = kcx * Cx0 + Ki Cz^2 + Cx_wave
#[derive(Debug, Clone)]
pub struct Aerodynamics {
    /// Technology factor on parasitic drag (0.99 to 1.03)
    pub kcx_correction: f64,
    pub cx0: f64,
    /// Induced drag factor 1 / (pi A e)
    pub ki: f64,
    pub oswald: f64,
    /// Compressibility drag at cruise Mach
    pub cx_wave: f64,
    pub czmax_to: f64,
    pub czmax_ld: f64,
}

impl Default for Aerodynamics {
    fn default() -> Self {
        Self {
            kcx_correction: 1.0,
            cx0: 0.0,
            ki: 0.0,
            oswald: 0.80,
            cx_wave: 0.0010,
            czmax_to: 2.0,
            czmax_ld: 2.6,
        }
    }
}

impl Aerodynamics {
    /// Drag coefficient at lift coefficient `cz` and Mach `mach`.
    pub fn cx(&self, cz: f64, mach: f64) -> f64 {
        let wave = if mach >= 0.7 { self.cx_wave } else { 0.0 };
        self.kcx_correction * self.cx0 + self.ki * cz * cz + wave
    }
}

/// Aircraft level masses.
#[derive(Debug, Clone, Default)]
pub struct WeightCg {
    /// Maximum take-off weight
    pub mtow: f64,
    /// Maximum landing weight
    pub mlw: f64,
    /// Maximum zero fuel weight
    pub mzfw: f64,
    /// Operating weight empty
    pub owe: f64,
    /// Manufacturer weight empty
    pub mwe: f64,
    /// Maximum fuel weight (tank capacity)
    pub mfw: f64,
    pub systems: f64,
    pub furnishing: f64,
    pub operator_items: f64,
    pub nominal_payload: f64,
    pub max_payload: f64,
}

/// Per-trip operating costs on the cost mission, US$.
#[derive(Debug, Clone)]
pub struct Economics {
    /// $/kg of fuel
    pub fuel_price: f64,
    /// Block hours flown per year
    pub utilization: f64,
    /// $/kg of empty weight
    pub price_per_kg: f64,
    /// Years over which the aircraft is depreciated to 10 % residual value
    pub depreciation_period: f64,
    pub interest_rate: f64,
    pub insurance_rate: f64,
    pub aircraft_price: f64,
    pub fuel_cost: f64,
    pub crew_cost: f64,
    pub maintenance_cost: f64,
    pub fees: f64,
    pub depreciation: f64,
    pub interest: f64,
    pub insurance: f64,
    /// fuel + crew + maintenance + fees
    pub cash_op_cost: f64,
    /// cash + insurance
    pub std_op_cost: f64,
    /// standard + depreciation + interest
    pub direct_op_cost: f64,
}

impl Default for Economics {
    fn default() -> Self {
        Self {
            fuel_price: 0.7,
            utilization: 3000.0,
            price_per_kg: 1100.0,
            depreciation_period: 15.0,
            interest_rate: 0.04,
            insurance_rate: 0.005,
            aircraft_price: 0.0,
            fuel_cost: 0.0,
            crew_cost: 0.0,
            maintenance_cost: 0.0,
            fees: 0.0,
            depreciation: 0.0,
            interest: 0.0,
            insurance: 0.0,
            cash_op_cost: 0.0,
            std_op_cost: 0.0,
            direct_op_cost: 0.0,
        }
    }
}

/// ICAO CO2 standard metric.
///
///   metric = avg(1 / SAR) / RGF^0.24
///
/// with SAR the specific air range (m/kg) at three reference masses and RGF
/// the reference geometric factor (pressurised floor area, m2).
#[derive(Debug, Clone, Default)]
#[allow(non_snake_case)]
pub struct Environment {
    pub rgf: f64,
    /// kg/m/m^0.48
    pub CO2_metric: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_thrust_lapse() {
        let ps = PowerSystem::default();
        let sl = Atmosphere::at(0.0, 0.0);
        assert_relative_eq!(ps.thrust(&sl, 0.0, MTO), 242_000.0);

        let crz = Atmosphere::at(10_668.0, 0.0);
        let mcl = ps.thrust(&crz, 0.78, MCL);
        assert!(mcl < 0.3 * 242_000.0 && mcl > 0.2 * 242_000.0);
        assert!(ps.thrust(&crz, 0.78, MCR) < mcl);
    }

    #[test]
    fn test_polar() {
        let aero = Aerodynamics {
            cx0: 0.02,
            ki: 0.04,
            ..Aerodynamics::default()
        };
        assert_relative_eq!(aero.cx(0.5, 0.3), 0.03, max_relative = 1e-12);
        assert_relative_eq!(aero.cx(0.5, 0.78), 0.031, max_relative = 1e-12);
    }
}
