//! Addressable fields of [`Aircraft`].

use once_cell::sync::Lazy;

use crate::address::{Addressable, Registry};

use super::Aircraft;

static AIRCRAFT_FIELDS: Lazy<Registry<Aircraft>> = Lazy::new(|| {
    let mut reg: Registry<Aircraft> = Registry::new("aircraft");
    crate::fields!(reg, Aircraft, "aircraft";
        requirement.n_pax_ref,
        requirement.design_range,
        requirement.cruise_mach,
        requirement.cruise_altp,
        requirement.cruise_disa,
        requirement.cost_range,
        requirement.max_body_aspect_ratio,
        requirement.take_off.altp,
        requirement.take_off.disa,
        requirement.take_off.tofl_req,
        requirement.approach.altp,
        requirement.approach.disa,
        requirement.approach.app_speed_req,
        requirement.mcl_ceiling.altp,
        requirement.mcl_ceiling.disa,
        requirement.mcl_ceiling.mach,
        requirement.mcl_ceiling.vz_req,
        requirement.mcr_ceiling.altp,
        requirement.mcr_ceiling.disa,
        requirement.mcr_ceiling.mach,
        requirement.mcr_ceiling.vz_req,
        requirement.oei_ceiling.altp,
        requirement.oei_ceiling.disa,
        requirement.oei_ceiling.path_req,
        requirement.time_to_climb.altp1,
        requirement.time_to_climb.cas1,
        requirement.time_to_climb.altp2,
        requirement.time_to_climb.cas2,
        requirement.time_to_climb.altp,
        requirement.time_to_climb.disa,
        requirement.time_to_climb.ttc_req,
    );
    crate::fields!(reg, Aircraft, "aircraft";
        airframe.body.n_abreast,
        airframe.body.n_aisle,
        airframe.body.width,
        airframe.body.cabin_length,
        airframe.body.nose_length,
        airframe.body.tail_length,
        airframe.body.length,
        airframe.body.aspect_ratio,
        airframe.body.wetted_area,
        airframe.body.mass,
        airframe.body.mass_correction_factor,
        airframe.wing.area,
        airframe.wing.aspect_ratio,
        airframe.wing.span,
        airframe.wing.mac,
        airframe.wing.sweep25,
        airframe.wing.toc,
        airframe.wing.wetted_area,
        airframe.wing.mass,
        airframe.wing.mass_correction_factor,
        airframe.tank.ref_length,
        airframe.tank.length,
        airframe.tank.diameter,
        airframe.tank.count,
        airframe.tank.gross_volume,
        airframe.tank.mfw_factor,
        airframe.tank.volumetric_index,
        airframe.tank.gravimetric_index,
        airframe.tank.fuel_density,
        airframe.tank.wetted_area,
        airframe.tank.mass,
        airframe.horizontal_stab.volume_factor,
        airframe.horizontal_stab.lever_arm,
        airframe.horizontal_stab.area,
        airframe.horizontal_stab.wetted_area,
        airframe.horizontal_stab.mass,
        airframe.horizontal_stab.mass_correction_factor,
        airframe.vertical_stab.volume_factor,
        airframe.vertical_stab.lever_arm,
        airframe.vertical_stab.area,
        airframe.vertical_stab.wetted_area,
        airframe.vertical_stab.mass,
        airframe.vertical_stab.mass_correction_factor,
        airframe.nacelle.engine_bpr,
        airframe.nacelle.diameter,
        airframe.nacelle.length,
        airframe.nacelle.wetted_area,
        airframe.nacelle.mass,
        airframe.landing_gear.mass,
        airframe.landing_gear.mass_correction_factor,
    );
    crate::fields!(reg, Aircraft, "aircraft";
        power_system.reference_thrust,
        power_system.n_engine,
        power_system.sfc_correction,
        power_system.tsfc_crz,
        power_system.crz_thrust,
        aerodynamics.kcx_correction,
        aerodynamics.cx0,
        aerodynamics.ki,
        aerodynamics.oswald,
        aerodynamics.cx_wave,
        aerodynamics.czmax_to,
        aerodynamics.czmax_ld,
        weight_cg.mtow,
        weight_cg.mlw,
        weight_cg.mzfw,
        weight_cg.owe,
        weight_cg.mwe,
        weight_cg.mfw,
        weight_cg.systems,
        weight_cg.furnishing,
        weight_cg.operator_items,
        weight_cg.nominal_payload,
        weight_cg.max_payload,
    );
    crate::fields!(reg, Aircraft, "aircraft";
        performance.take_off.tofl_req,
        performance.take_off.tofl_eff,
        performance.approach.app_speed_req,
        performance.approach.app_speed_eff,
        performance.mcl_ceiling.vz_req,
        performance.mcl_ceiling.vz_eff,
        performance.mcr_ceiling.vz_req,
        performance.mcr_ceiling.vz_eff,
        performance.oei_ceiling.path_req,
        performance.oei_ceiling.path_eff,
        performance.time_to_climb.ttc_req,
        performance.time_to_climb.ttc_eff,
        performance.mission.crz_lod,
        performance.mission.crz_tsfc,
        performance.mission.crz_tas,
        performance.mission.nominal.range,
        performance.mission.nominal.payload,
        performance.mission.nominal.tow,
        performance.mission.nominal.fuel_block,
        performance.mission.nominal.fuel_reserve,
        performance.mission.nominal.fuel_total,
        performance.mission.nominal.time_block,
        performance.mission.cost.range,
        performance.mission.cost.payload,
        performance.mission.cost.tow,
        performance.mission.cost.fuel_block,
        performance.mission.cost.fuel_reserve,
        performance.mission.cost.fuel_total,
        performance.mission.cost.time_block,
    );
    crate::fields!(reg, Aircraft, "aircraft";
        economics.fuel_price,
        economics.utilization,
        economics.price_per_kg,
        economics.depreciation_period,
        economics.interest_rate,
        economics.insurance_rate,
        economics.aircraft_price,
        economics.fuel_cost,
        economics.crew_cost,
        economics.maintenance_cost,
        economics.fees,
        economics.depreciation,
        economics.interest,
        economics.insurance,
        economics.cash_op_cost,
        economics.std_op_cost,
        economics.direct_op_cost,
        environment.rgf,
        environment.CO2_metric,
    );
    reg
});

impl Addressable for Aircraft {
    fn registry() -> &'static Registry<Self> {
        &AIRCRAFT_FIELDS
    }
}
