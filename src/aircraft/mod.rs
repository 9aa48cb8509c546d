//! Reduced-order turbofan airliner model.
//!
//! The [`Aircraft`] aggregate is the design state the MDA converges. Its
//! structure mirrors the usual aircraft design breakdown:
//!
//! - [`Arrangement`] and [`Requirement`] are inputs, fixed at construction
//! - [`Airframe`] holds component geometry and masses
//! - `power_system`, `aerodynamics`, `weight_cg`, `performance`, `economics`
//!   and `environment` hold discipline outputs and technology factors
//!
//! Every scalar is addressable by dotted path under the `aircraft` root, and
//! [`Coupled::schedule`] gives the discipline order:
//!
//! ```text
//! mda       geometry -> mass -> aerodynamics -> propulsion -> mission
//!             -> performance -> economics -> environment
//! mda_plus  tank[tank_sizing, mass, mission] -> (same as mda)
//! ```

mod airframe;
mod arrangement;
mod atmosphere;
mod disciplines;
mod performance;
mod registry;
mod requirement;
mod systems;

pub use airframe::{Airframe, Body, LandingGear, Nacelle, Stabilizer, Tank, Wing};
pub use arrangement::{
    Arrangement, BodyType, FuelType, NacelleAttachment, NumberOfEngine, PowerArchitecture, PowerSource,
    StabArchitecture, TankArchitecture, WingAttachment, WingType,
};
pub use atmosphere::Atmosphere;
pub use disciplines::{
    AeroAnalysis, EconomicsAnalysis, EnvironmentAnalysis, GeometryAnalysis, MassAnalysis, MissionAnalysis,
    PerformanceAnalysis, PropulsionAnalysis, TankSizing,
};
pub use performance::{Approach, Ceiling, Mission, MissionResult, OeiCeiling, Performance, TakeOff, TimeToClimb};
pub use requirement::{ApproachReq, CeilingReq, OeiCeilingReq, Requirement, TakeOffReq, TimeToClimbReq};
pub use systems::{Aerodynamics, Economics, Environment, PowerSystem, WeightCg};

use tracing::debug;

use crate::error::{MdoError, Result};
use crate::mda::{Coupled, Discipline, MdaMode, Schedule};

/// Usable over gross volume of an insulated LH2 tank.
const H2_VOLUMETRIC_INDEX: f64 = 0.845;
/// Fuel over fuel plus structure mass of an LH2 tank.
const H2_GRAVIMETRIC_INDEX: f64 = 0.3;

/// Fuel price, $/kg
const KEROSENE_PRICE: f64 = 0.7;
const HYDROGEN_PRICE: f64 = 4.0;

/// The whole design state.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub name: String,
    pub arrangement: Arrangement,
    pub requirement: Requirement,
    pub airframe: Airframe,
    pub power_system: PowerSystem,
    pub aerodynamics: Aerodynamics,
    pub weight_cg: WeightCg,
    pub performance: Performance,
    pub economics: Economics,
    pub environment: Environment,
}

impl Aircraft {
    /// Build an aircraft for `arrangement` and `requirement`.
    ///
    /// Technology defaults follow the fuel type. Masses and mission fuel get
    /// rough starting values and the geometry is sized once, so the first MDA
    /// can start cold.
    pub fn new(name: impl Into<String>, arrangement: Arrangement, requirement: Requirement) -> Result<Self> {
        arrangement.validate()?;
        if requirement.n_pax_ref.is_nan() || requirement.n_pax_ref <= 0.0 {
            return Err(MdoError::config("n_pax_ref must be positive"));
        }
        if requirement.design_range.is_nan() || requirement.design_range <= 0.0 {
            return Err(MdoError::config("design_range must be positive"));
        }
        let mach = requirement.cruise_mach;
        if mach.is_nan() || mach <= 0.0 || mach >= 1.0 {
            return Err(MdoError::config(format!("cruise_mach must lie in (0, 1), got {}", mach)));
        }

        let fuel = arrangement.fuel_type;
        let mut requirement = requirement;
        requirement.oei_ceiling.path_req = arrangement.number_of_engine.oei_path_req();

        let mut airframe = Airframe::default();
        airframe.tank.fuel_density = fuel.density();
        airframe.tank.length = airframe.tank.ref_length;
        if fuel.is_hydrogen() {
            airframe.tank.volumetric_index = H2_VOLUMETRIC_INDEX;
            airframe.tank.gravimetric_index = H2_GRAVIMETRIC_INDEX;
        }

        let power_system = PowerSystem {
            n_engine: arrangement.number_of_engine.count(),
            ..PowerSystem::default()
        };
        let economics = Economics {
            fuel_price: if fuel.is_hydrogen() { HYDROGEN_PRICE } else { KEROSENE_PRICE },
            ..Economics::default()
        };

        let n_pax = requirement.n_pax_ref;
        let mtow = 400.0 * n_pax;
        let weight_cg = WeightCg {
            mtow,
            mlw: mtow,
            owe: 0.6 * mtow,
            nominal_payload: 105.0 * n_pax,
            ..WeightCg::default()
        };
        let mut performance = Performance::default();
        performance.mission.nominal.fuel_total = 0.1 * mtow;

        let mut ac = Self {
            name: name.into(),
            arrangement,
            requirement,
            airframe,
            power_system,
            aerodynamics: Aerodynamics::default(),
            weight_cg,
            performance,
            economics,
            environment: Environment::default(),
        };
        GeometryAnalysis.update(&mut ac);
        AeroAnalysis.update(&mut ac);
        PropulsionAnalysis.update(&mut ac);
        debug!(name = %ac.name, mtow, "aircraft built");
        Ok(ac)
    }
}

impl Coupled for Aircraft {
    fn schedule(mode: MdaMode) -> Schedule<Self> {
        let schedule = match mode {
            MdaMode::Mda => Schedule::new(),
            MdaMode::MdaPlus => Schedule::new().sub_loop(
                "tank",
                vec![
                    Box::new(TankSizing) as Box<dyn Discipline<Aircraft>>,
                    Box::new(MassAnalysis),
                    Box::new(MissionAnalysis),
                ],
            ),
        };
        schedule
            .step(GeometryAnalysis)
            .step(MassAnalysis)
            .step(AeroAnalysis)
            .step(PropulsionAnalysis)
            .step(MissionAnalysis)
            .step(PerformanceAnalysis)
            .step(EconomicsAnalysis)
            .step(EnvironmentAnalysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{self, Addressable};
    use crate::mda::run_mda;
    use crate::units;
    use approx::assert_relative_eq;

    fn h2_aircraft() -> Aircraft {
        let mut reqs = Requirement::new(150.0, units::m_NM(1800.0), 0.78, units::m_ft(35000.0));
        reqs.take_off.tofl_req = 2200.0;
        let mut ac = Aircraft::new("h2", Arrangement::h2_turbofan(), reqs).unwrap();
        ac.airframe.wing.area = 164.0;
        ac
    }

    #[test]
    fn test_both_modes_reach_same_design() {
        let mut plain = h2_aircraft();
        let mut plus = h2_aircraft();
        let r1 = run_mda(&mut plain, MdaMode::Mda);
        let r2 = run_mda(&mut plus, MdaMode::MdaPlus);

        assert!(r1.converged, "{:?}", r1.warning);
        assert!(r2.converged, "{:?}", r2.warning);
        assert!(r2.passes < r1.passes, "mda_plus {} vs mda {}", r2.passes, r1.passes);
        assert_relative_eq!(plain.weight_cg.mtow, plus.weight_cg.mtow, max_relative = 1e-4);
    }

    #[test]
    fn test_converged_design_is_consistent() {
        let mut ac = h2_aircraft();
        assert!(run_mda(&mut ac, MdaMode::Mda).converged);

        let w = &ac.weight_cg;
        let fuel = ac.performance.mission.nominal.fuel_total;
        assert_relative_eq!(w.mtow, w.owe + w.nominal_payload + fuel, max_relative = 1e-5);
        assert_relative_eq!(w.mfw, fuel, max_relative = 1e-5);
        assert!(w.mtow > 60_000.0 && w.mtow < 85_000.0, "mtow {}", w.mtow);
        assert!(w.mlw <= w.mtow);
        assert!(ac.airframe.tank.length > 3.0 && ac.airframe.tank.length < 15.0);
        assert!(ac.airframe.body.aspect_ratio < ac.requirement.max_body_aspect_ratio);

        let perf = &ac.performance;
        assert_eq!(perf.take_off.tofl_req, 2200.0);
        assert!(perf.take_off.tofl_eff < perf.take_off.tofl_req);
        assert!(perf.mcl_ceiling.vz_eff > perf.mcr_ceiling.vz_eff);
        assert!(perf.mission.crz_lod > 12.0 && perf.mission.crz_lod < 20.0);
        assert!(perf.mission.cost.fuel_block < perf.mission.nominal.fuel_block);
        assert!(ac.economics.direct_op_cost > ac.economics.cash_op_cost);
        assert!(ac.environment.CO2_metric > 0.0);
    }

    #[test]
    fn test_second_solve_is_immediate() {
        let mut ac = h2_aircraft();
        run_mda(&mut ac, MdaMode::MdaPlus);
        let mtow = ac.weight_cg.mtow;

        let report = run_mda(&mut ac, MdaMode::MdaPlus);
        assert!(report.converged);
        assert!(report.passes <= 2);
        assert_relative_eq!(ac.weight_cg.mtow, mtow, max_relative = 1e-5);
    }

    #[test]
    fn test_kerosene_wing_box() {
        let reqs = Requirement::new(150.0, units::m_NM(1800.0), 0.78, units::m_ft(35000.0));
        let mut ac = Aircraft::new("jet", Arrangement::default(), reqs).unwrap();
        assert!(run_mda(&mut ac, MdaMode::Mda).converged);

        assert_eq!(ac.airframe.tank.mass, 0.0);
        assert!(ac.weight_cg.mfw > ac.performance.mission.nominal.fuel_total);
        assert_eq!(ac.economics.fuel_price, KEROSENE_PRICE);
    }

    #[test]
    fn test_thrust_trades_field_length_for_mass() {
        let mut small = h2_aircraft();
        let mut large = h2_aircraft();
        small.power_system.reference_thrust = 100_000.0;
        large.power_system.reference_thrust = 150_000.0;
        run_mda(&mut small, MdaMode::MdaPlus);
        run_mda(&mut large, MdaMode::MdaPlus);

        assert!(large.performance.take_off.tofl_eff < small.performance.take_off.tofl_eff);
        assert!(large.performance.mcl_ceiling.vz_eff > small.performance.mcl_ceiling.vz_eff);
        assert!(large.weight_cg.mtow > small.weight_cg.mtow);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let reqs = Requirement::new(150.0, units::m_NM(1800.0), 0.78, units::m_ft(35000.0));
        let h2_in_wing = Arrangement {
            fuel_type: FuelType::LiquidH2,
            ..Arrangement::default()
        };
        assert!(Aircraft::new("x", h2_in_wing, reqs.clone()).is_err());

        let supersonic = Requirement::new(150.0, units::m_NM(1800.0), 1.6, units::m_ft(35000.0));
        assert!(matches!(
            Aircraft::new("x", Arrangement::h2_turbofan(), supersonic),
            Err(MdoError::Config { .. })
        ));
    }

    #[test]
    fn test_addressable() {
        let mut ac = h2_aircraft();
        assert_eq!(address::get(&ac, "aircraft.airframe.wing.area").unwrap(), 164.0);
        address::set(&mut ac, "aircraft.power_system.reference_thrust", 130_000.0).unwrap();
        assert_eq!(ac.power_system.reference_thrust, 130_000.0);

        assert!(matches!(
            address::get(&ac, "aircraft.airframe.wing"),
            Err(MdoError::NotScalar { .. })
        ));
        assert!(address::get(&ac, "aircraft.environment.CO2_metric").is_ok());
        assert!(Aircraft::registry().paths().all(|p| p.starts_with("aircraft.")));
    }

    #[test]
    fn test_schedules() {
        assert_eq!(
            Aircraft::schedule(MdaMode::Mda).describe(),
            "geometry -> mass -> aerodynamics -> propulsion -> mission -> performance -> economics -> environment"
        );
        let plus = Aircraft::schedule(MdaMode::MdaPlus);
        assert!(plus.describe().starts_with("tank[tank_sizing, mass, mission] -> geometry"));
        assert_eq!(plus.disciplines().len(), 9);
    }
}
