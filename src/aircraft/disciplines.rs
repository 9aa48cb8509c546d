//! The coupled disciplines of the aircraft model.
//!
//! Reduced-order relations calibrated on 150 seat medium-range airliners.
//! Each discipline only writes its own outputs. The couplings that need a
//! fixed point are:
//!
//!   MTOW -> wing, gear, systems masses -> OWE -> MTOW
//!   MTOW -> cruise lift -> mission fuel -> MTOW
//!   mission fuel -> tank length -> fuselage length -> body mass -> MTOW
//!
//! The first two are closed by [`MassAnalysis`] and reported as the
//! relative MTOW gap, the last one by [`TankSizing`] as the relative gap
//! between tank capacity and required fuel.

use std::f64::consts::PI;

use crate::mda::Discipline;

use super::airframe::Tank;
use super::arrangement::{StabArchitecture, TankArchitecture, WingAttachment};
use super::atmosphere::{Atmosphere, G};
use super::performance::MissionResult;
use super::requirement::CeilingReq;
use super::systems::{MCL, MCN, MCR, MTO};
use super::Aircraft;

/// Equivalent skin friction per unit wetted area, form factor included.
const SKIN_FRICTION: f64 = 1.15 * 0.0026;

/// Cruise TSFC of a kerosene turbofan with bypass ratio 9, kg/N/s.
const KEROSENE_TSFC: f64 = 1.53e-5;
const KEROSENE_LHV: f64 = 43.1e6;

/// Taxi, take-off and approach fuel as a fraction of take-off weight.
const ALLOWANCE_FACTOR: f64 = 0.003;
/// Contingency fuel as a fraction of block fuel.
const CONTINGENCY_FACTOR: f64 = 0.05;
/// Reserve holding time, s
const HOLDING_TIME: f64 = 1800.0;
/// Block time spent outside cruise, s
const BLOCK_OVERHEAD: f64 = 1800.0;

/// Fraction of MTOW used for the climb and ceiling evaluations.
const CLIMB_MASS_RATIO: f64 = 0.97;
/// Fraction of MTOW flown at mid cruise.
const CRUISE_MASS_RATIO: f64 = 0.95;

const TTC_STEPS: usize = 20;
const MIN_CLIMB_SPEED: f64 = 0.1;
const COST_MISSION_ITERATIONS: usize = 8;

/// `value` scaled by `reference`, never by less than one unit.
fn relative(value: f64, reference: f64) -> f64 {
    value / reference.abs().max(1.0)
}

fn seats_abreast(n_pax: f64) -> f64 {
    match n_pax {
        n if n < 8.0 => 2.0,
        n if n < 16.0 => 3.0,
        n if n < 70.0 => 4.0,
        n if n < 120.0 => 5.0,
        n if n < 225.0 => 6.0,
        n if n < 300.0 => 8.0,
        n if n < 375.0 => 9.0,
        _ => 10.0,
    }
}

fn size_cabin(ac: &mut Aircraft) {
    let n_pax = ac.requirement.n_pax_ref;
    let body = &mut ac.airframe.body;
    body.n_abreast = seats_abreast(n_pax);
    body.n_aisle = if body.n_abreast <= 6.0 { 1.0 } else { 2.0 };
    body.width = 0.48 * body.n_abreast + 0.55 * body.n_aisle + 0.52;
    body.cabin_length = 0.81 * n_pax / body.n_abreast + 6.0;
    body.nose_length = 1.5 * body.width;
    body.tail_length = 1.4 * body.width;
}

fn size_wing(ac: &mut Aircraft) {
    let wing = &mut ac.airframe.wing;
    wing.span = (wing.area * wing.aspect_ratio).sqrt();
    wing.mac = 1.2 * wing.area / wing.span;
    wing.wetted_area = 2.0 * 0.9 * wing.area * (1.0 + 0.25 * wing.toc);
}

/// Wing box tanks have a fixed volume. Cylindrical tanks keep the diameter
/// the fuselage allows and stretch to hold the required fuel.
fn size_tank(ac: &mut Aircraft) {
    let architecture = ac.arrangement.tank_architecture;
    let required = ac.airframe.tank.mfw_factor * ac.performance.mission.nominal.fuel_total;
    let width = ac.airframe.body.width;
    let wing = &ac.airframe.wing;
    let tank = &mut ac.airframe.tank;

    match architecture {
        TankArchitecture::WingBox => {
            tank.count = 1.0;
            tank.diameter = 0.0;
            tank.length = 0.0;
            tank.wetted_area = 0.0;
            tank.gross_volume = tank.mfw_factor * 0.3 * wing.area * wing.toc * wing.mac;
        }
        _ => {
            let (diameter_ratio, count) = match architecture {
                TankArchitecture::Rear => (0.9, 1.0),
                TankArchitecture::PiggyBack => (0.5, 1.0),
                _ => (0.45, 2.0),
            };
            tank.count = count;
            tank.diameter = diameter_ratio * width;
            let volume = required / (tank.fuel_density * tank.volumetric_index);
            tank.length = Tank::cylinder_length(tank.diameter, volume / count);
            tank.gross_volume = count * Tank::cylinder_volume(tank.diameter, tank.length);
            tank.wetted_area = if architecture == TankArchitecture::Rear {
                0.0
            } else {
                count * PI * tank.diameter * tank.length
            };
        }
    }
    tank.mass = tank.capacity() * (1.0 / tank.gravimetric_index - 1.0);
}

fn size_fuselage(ac: &mut Aircraft) {
    let rear_tank = match ac.arrangement.tank_architecture {
        TankArchitecture::Rear => ac.airframe.tank.length,
        _ => 0.0,
    };
    let body = &mut ac.airframe.body;
    body.length = body.nose_length + body.cabin_length + rear_tank + body.tail_length;
    body.aspect_ratio = body.length / body.width;
    body.wetted_area = 0.9 * PI * body.width * body.length;
}

fn size_tails(ac: &mut Aircraft) {
    let htp_factor = match ac.arrangement.stab_architecture {
        StabArchitecture::Classic => 1.0,
        StabArchitecture::TTail => 0.9,
        StabArchitecture::HTail => 1.05,
    };
    let af = &mut ac.airframe;
    let lever_arm = 0.45 * af.body.length;

    let htp = &mut af.horizontal_stab;
    htp.lever_arm = lever_arm;
    htp.area = htp_factor * htp.volume_factor * af.wing.area * af.wing.mac / lever_arm;
    htp.wetted_area = 2.1 * htp.area;

    let vtp = &mut af.vertical_stab;
    vtp.lever_arm = lever_arm;
    vtp.area = vtp.volume_factor * af.wing.area * af.wing.span / lever_arm;
    vtp.wetted_area = 2.1 * vtp.area;
}

fn size_nacelle(ac: &mut Aircraft) {
    let thrust = ac.power_system.reference_thrust;
    let nacelle = &mut ac.airframe.nacelle;
    nacelle.diameter = 0.18 * (thrust / 1000.0).sqrt() * ((1.0 + nacelle.engine_bpr) / 10.0).powf(0.25);
    nacelle.length = 1.7 * nacelle.diameter;
    nacelle.wetted_area = 1.05 * PI * nacelle.diameter * nacelle.length;
}

/// Required over available fuel volume, zero for fixed wing box tanks.
fn tank_residual(ac: &Aircraft) -> f64 {
    if ac.arrangement.tank_architecture == TankArchitecture::WingBox {
        return 0.0;
    }
    let required = ac.airframe.tank.mfw_factor * ac.performance.mission.nominal.fuel_total;
    relative(ac.airframe.tank.capacity() - required, required)
}

/// Component dimensions and wetted areas, tanks included.
pub struct GeometryAnalysis;

impl Discipline<Aircraft> for GeometryAnalysis {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn update(&self, ac: &mut Aircraft) {
        size_cabin(ac);
        size_wing(ac);
        size_tank(ac);
        size_fuselage(ac);
        size_tails(ac);
        size_nacelle(ac);
    }

    fn eval_residual(&self, ac: &Aircraft) -> f64 {
        tank_residual(ac)
    }
}

/// Tank sizing alone, with the fuselage stretch it causes.
pub struct TankSizing;

impl Discipline<Aircraft> for TankSizing {
    fn name(&self) -> &'static str {
        "tank_sizing"
    }

    fn update(&self, ac: &mut Aircraft) {
        size_tank(ac);
        size_fuselage(ac);
    }

    fn eval_residual(&self, ac: &Aircraft) -> f64 {
        tank_residual(ac)
    }
}

/// Component masses and the aircraft weight breakdown.
///
///   MTOW = OWE + nominal payload + nominal mission fuel
pub struct MassAnalysis;

impl Discipline<Aircraft> for MassAnalysis {
    fn name(&self) -> &'static str {
        "mass"
    }

    fn update(&self, ac: &mut Aircraft) {
        let n_pax = ac.requirement.n_pax_ref;
        let n_engine = ac.power_system.n_engine;
        let thrust = ac.power_system.reference_thrust;
        let mtow = ac.weight_cg.mtow;
        let gear_factor = match ac.arrangement.wing_attachment {
            WingAttachment::Low => 1.0,
            WingAttachment::High => 1.1,
        };

        let af = &mut ac.airframe;
        af.body.mass = af.body.mass_correction_factor * 5.80 * (PI * af.body.width * af.body.length).powf(1.2);
        af.wing.mass = af.wing.mass_correction_factor
            * 0.233
            * mtow.powf(0.6)
            * af.wing.area.sqrt()
            * af.wing.aspect_ratio.powf(0.6);
        af.horizontal_stab.mass = af.horizontal_stab.mass_correction_factor * 22.0 * af.horizontal_stab.area;
        af.vertical_stab.mass = af.vertical_stab.mass_correction_factor * 25.0 * af.vertical_stab.area;
        af.nacelle.mass = 0.0226 * thrust * (1.0 + 0.02 * (af.nacelle.engine_bpr - 5.0)) * 1.15;
        af.landing_gear.mass = af.landing_gear.mass_correction_factor * gear_factor * 0.035 * mtow;

        let structure = af.body.mass
            + af.wing.mass
            + af.horizontal_stab.mass
            + af.vertical_stab.mass
            + n_engine * af.nacelle.mass
            + af.landing_gear.mass
            + af.tank.mass;
        let capacity = af.tank.capacity();
        let fuel_total = ac.performance.mission.nominal.fuel_total;

        let w = &mut ac.weight_cg;
        w.systems = 0.545 * mtow.powf(0.8);
        w.furnishing = 20.0 * n_pax;
        w.operator_items = 8.0 * n_pax + 400.0;
        w.nominal_payload = 105.0 * n_pax;
        w.max_payload = 130.0 * n_pax;

        w.mwe = structure + w.systems + w.furnishing;
        w.owe = w.mwe + w.operator_items;
        w.mtow = w.owe + w.nominal_payload + fuel_total;
        w.mzfw = w.owe + w.max_payload;
        w.mlw = w.mtow.min(1.07 * w.mzfw);
        w.mfw = capacity;
    }

    fn eval_residual(&self, ac: &Aircraft) -> f64 {
        let w = &ac.weight_cg;
        let fuel_total = ac.performance.mission.nominal.fuel_total;
        relative(w.mtow - (w.owe + w.nominal_payload + fuel_total), w.mtow)
    }
}

/// Parasitic and induced drag.
pub struct AeroAnalysis;

impl Discipline<Aircraft> for AeroAnalysis {
    fn name(&self) -> &'static str {
        "aerodynamics"
    }

    fn update(&self, ac: &mut Aircraft) {
        let af = &ac.airframe;
        let wetted = af.body.wetted_area
            + af.wing.wetted_area
            + af.horizontal_stab.wetted_area
            + af.vertical_stab.wetted_area
            + ac.power_system.n_engine * af.nacelle.wetted_area
            + af.tank.wetted_area;
        let aero = &mut ac.aerodynamics;
        aero.cx0 = SKIN_FRICTION * wetted / af.wing.area;
        aero.ki = 1.0 / (PI * af.wing.aspect_ratio * aero.oswald);
    }
}

/// Cruise consumption, scaled from kerosene by heating value.
pub struct PropulsionAnalysis;

impl Discipline<Aircraft> for PropulsionAnalysis {
    fn name(&self) -> &'static str {
        "propulsion"
    }

    fn update(&self, ac: &mut Aircraft) {
        let lhv = ac.arrangement.fuel_type.heating_value();
        let bpr = ac.airframe.nacelle.engine_bpr;
        let req = &ac.requirement;
        let atm = Atmosphere::at(req.cruise_altp, req.cruise_disa);

        let ps = &mut ac.power_system;
        ps.tsfc_crz = ps.sfc_correction * KEROSENE_TSFC * (KEROSENE_LHV / lhv) * (bpr / 9.0).powf(-0.15);
        ps.crz_thrust = ps.thrust(&atm, req.cruise_mach, MCR);
    }
}

/// Lift over drag in cruise at `mass`.
fn cruise_lod(ac: &Aircraft, mass: f64) -> f64 {
    let req = &ac.requirement;
    let atm = Atmosphere::at(req.cruise_altp, req.cruise_disa);
    let cz = mass * G / (atm.dynamic_pressure(req.cruise_mach) * ac.airframe.wing.area);
    cz / ac.aerodynamics.cx(cz, req.cruise_mach)
}

/// Block and reserve fuel for `range` from take-off weight `tow` (Breguet).
fn fuel_burn(ac: &Aircraft, range: f64, tow: f64, lod: f64, tas: f64) -> (f64, f64) {
    let tsfc = ac.power_system.tsfc_crz;
    let factor = (range * G * tsfc / (tas * lod)).exp();
    let allowance = ALLOWANCE_FACTOR * tow;
    let block = allowance + (tow - allowance) * (1.0 - 1.0 / factor);
    let landing = tow - block;
    let holding = landing * (1.0 - (-HOLDING_TIME * G * tsfc / lod).exp());
    (block, CONTINGENCY_FACTOR * block + holding)
}

fn fly(ac: &Aircraft, range: f64, payload: f64, tow: f64, lod: f64, tas: f64) -> MissionResult {
    let (fuel_block, fuel_reserve) = fuel_burn(ac, range, tow, lod, tas);
    MissionResult {
        range,
        payload,
        tow,
        fuel_block,
        fuel_reserve,
        fuel_total: fuel_block + fuel_reserve,
        time_block: range / tas + BLOCK_OVERHEAD,
    }
}

/// Nominal mission at MTOW, and the cost mission at the take-off weight
/// that carries exactly its own fuel.
pub struct MissionAnalysis;

impl Discipline<Aircraft> for MissionAnalysis {
    fn name(&self) -> &'static str {
        "mission"
    }

    fn update(&self, ac: &mut Aircraft) {
        let req = &ac.requirement;
        let atm = Atmosphere::at(req.cruise_altp, req.cruise_disa);
        let tas = req.cruise_mach * atm.vsnd;
        let mtow = ac.weight_cg.mtow;
        let payload = ac.weight_cg.nominal_payload;
        let lod = cruise_lod(ac, CRUISE_MASS_RATIO * mtow);

        let nominal = fly(ac, req.design_range, payload, mtow, lod, tas);

        let zfw = ac.weight_cg.owe + payload;
        let mut tow = zfw;
        for _ in 0..COST_MISSION_ITERATIONS {
            let (block, reserve) = fuel_burn(ac, req.cost_range, tow, lod, tas);
            tow = zfw + block + reserve;
        }
        let cost = fly(ac, req.cost_range, payload, tow, lod, tas);

        let mission = &mut ac.performance.mission;
        mission.crz_lod = lod;
        mission.crz_tsfc = ac.power_system.tsfc_crz;
        mission.crz_tas = tas;
        mission.nominal = nominal;
        mission.cost = cost;
    }
}

/// Residual vertical speed at a ceiling with the given rating.
fn ceiling_vz(ac: &Aircraft, req: &CeilingReq, rating: f64) -> f64 {
    let atm = Atmosphere::at(req.altp, req.disa);
    let mass = CLIMB_MASS_RATIO * ac.weight_cg.mtow;
    let area = ac.airframe.wing.area;
    let q = atm.dynamic_pressure(req.mach);
    let cz = mass * G / (q * area);
    let drag = q * area * ac.aerodynamics.cx(cz, req.mach);
    let thrust = ac.power_system.thrust(&atm, req.mach, rating);
    (thrust - drag) / (mass * G) * req.mach * atm.vsnd
}

fn take_off_field_length(ac: &Aircraft) -> f64 {
    let req = &ac.requirement.take_off;
    let atm = Atmosphere::at(req.altp, req.disa);
    let mtow = ac.weight_cg.mtow;
    let thrust = ac.power_system.thrust(&atm, 0.25, MTO);
    2.5 * (mtow / ac.airframe.wing.area) / (ac.aerodynamics.czmax_to * atm.sigma()) * (mtow * G / thrust) + 100.0
}

fn approach_speed(ac: &Aircraft) -> f64 {
    let req = &ac.requirement.approach;
    let atm = Atmosphere::at(req.altp, req.disa);
    let stall = (2.0 * ac.weight_cg.mlw * G / (atm.rho * ac.airframe.wing.area * ac.aerodynamics.czmax_ld)).sqrt();
    1.23 * stall
}

/// Climb gradient at the OEI ceiling, remaining engines at MCN.
fn oei_path(ac: &Aircraft) -> f64 {
    let req = &ac.requirement.oei_ceiling;
    let atm = Atmosphere::at(req.altp, req.disa);
    let mass = CLIMB_MASS_RATIO * ac.weight_cg.mtow;
    let cz = 0.6;
    let tas = (2.0 * mass * G / (atm.rho * ac.airframe.wing.area * cz)).sqrt();
    let mach = tas / atm.vsnd;
    let n = ac.power_system.n_engine;
    let thrust = ac.power_system.thrust(&atm, mach, MCN) * (n - 1.0) / n;
    thrust / (mass * G) - ac.aerodynamics.cx(cz, mach) / cz
}

/// Climb time from `altp1` to the cruise altitude, CAS schedule capped by
/// the cruise Mach.
fn time_to_climb(ac: &Aircraft) -> f64 {
    let req = &ac.requirement.time_to_climb;
    let max_mach = ac.requirement.cruise_mach;
    let mass = CLIMB_MASS_RATIO * ac.weight_cg.mtow;
    let area = ac.airframe.wing.area;
    let dh = (req.altp - req.altp1) / TTC_STEPS as f64;

    (0..TTC_STEPS)
        .map(|i| {
            let altp = req.altp1 + (i as f64 + 0.5) * dh;
            let atm = Atmosphere::at(altp, req.disa);
            let cas = if altp < req.altp2 { req.cas1 } else { req.cas2 };
            let mach = (atm.tas_from_cas(cas) / atm.vsnd).min(max_mach);
            let tas = mach * atm.vsnd;
            let q = 0.5 * atm.rho * tas * tas;
            let cz = mass * G / (q * area);
            let drag = q * area * ac.aerodynamics.cx(cz, mach);
            let thrust = ac.power_system.thrust(&atm, mach, MCL);
            let vz = ((thrust - drag) / (mass * G) * tas).max(MIN_CLIMB_SPEED);
            dh / vz
        })
        .sum()
}

/// Field, climb and ceiling performances against their requirements.
pub struct PerformanceAnalysis;

impl Discipline<Aircraft> for PerformanceAnalysis {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn update(&self, ac: &mut Aircraft) {
        let tofl = take_off_field_length(ac);
        let app_speed = approach_speed(ac);
        let mcl_vz = ceiling_vz(ac, &ac.requirement.mcl_ceiling, MCL);
        let mcr_vz = ceiling_vz(ac, &ac.requirement.mcr_ceiling, MCR);
        let path = oei_path(ac);
        let ttc = time_to_climb(ac);

        let req = &ac.requirement;
        let perf = &mut ac.performance;
        perf.take_off.tofl_req = req.take_off.tofl_req;
        perf.take_off.tofl_eff = tofl;
        perf.approach.app_speed_req = req.approach.app_speed_req;
        perf.approach.app_speed_eff = app_speed;
        perf.mcl_ceiling.vz_req = req.mcl_ceiling.vz_req;
        perf.mcl_ceiling.vz_eff = mcl_vz;
        perf.mcr_ceiling.vz_req = req.mcr_ceiling.vz_req;
        perf.mcr_ceiling.vz_eff = mcr_vz;
        perf.oei_ceiling.path_req = req.oei_ceiling.path_req;
        perf.oei_ceiling.path_eff = path;
        perf.time_to_climb.ttc_req = req.time_to_climb.ttc_req;
        perf.time_to_climb.ttc_eff = ttc;
    }
}

/// Per-trip operating costs on the cost mission.
pub struct EconomicsAnalysis;

impl Discipline<Aircraft> for EconomicsAnalysis {
    fn name(&self) -> &'static str {
        "economics"
    }

    fn update(&self, ac: &mut Aircraft) {
        let cost = &ac.performance.mission.cost;
        let block_hours = cost.time_block / 3600.0;
        let range_km = cost.range / 1000.0;
        let n_pax = ac.requirement.n_pax_ref;
        let mtow = ac.weight_cg.mtow;
        let mwe = ac.weight_cg.mwe;
        let installed_thrust = ac.power_system.n_engine * ac.power_system.reference_thrust;

        let eco = &mut ac.economics;
        eco.fuel_cost = cost.fuel_block * eco.fuel_price;
        eco.crew_cost = block_hours * (620.0 + 80.0 * (n_pax / 50.0).ceil());
        eco.maintenance_cost = block_hours * (0.010 * mwe + 0.0015 * installed_thrust);
        eco.fees = 0.0078 * mtow + 0.5 * range_km * (mtow / 50_000.0).sqrt();

        eco.aircraft_price = eco.price_per_kg * mwe;
        let trips = eco.utilization / block_hours;
        eco.depreciation = 0.9 * eco.aircraft_price / eco.depreciation_period / trips;
        eco.interest = eco.aircraft_price * eco.interest_rate / trips;
        eco.insurance = eco.aircraft_price * eco.insurance_rate / trips;

        eco.cash_op_cost = eco.fuel_cost + eco.crew_cost + eco.maintenance_cost + eco.fees;
        eco.std_op_cost = eco.cash_op_cost + eco.insurance;
        eco.direct_op_cost = eco.std_op_cost + eco.depreciation + eco.interest;
    }
}

/// Fuel-based CO2 metric at the three certification reference masses.
pub struct EnvironmentAnalysis;

impl Discipline<Aircraft> for EnvironmentAnalysis {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn update(&self, ac: &mut Aircraft) {
        let body = &ac.airframe.body;
        let rgf = body.cabin_length * 0.85 * body.width;
        let average = mean_inverse_sar(ac);

        ac.environment.rgf = rgf;
        ac.environment.CO2_metric = average / rgf.powf(0.24);
    }
}

/// Mean of 1 / SAR (kg/m) over the high, mid and low reference masses.
fn mean_inverse_sar(ac: &Aircraft) -> f64 {
    let mtow = ac.weight_cg.mtow;
    let tas = ac.performance.mission.crz_tas;
    let tsfc = ac.power_system.tsfc_crz;

    let high = 0.92 * mtow;
    let low = 0.45 * mtow + 0.63 * mtow.powf(0.924);
    let mid = 0.5 * (high + low);
    [high, mid, low]
        .iter()
        .map(|&mass| tsfc * mass * G / cruise_lod(ac, mass) / tas)
        .sum::<f64>()
        / 3.0
}
