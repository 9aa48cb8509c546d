//! Top level and operational requirements.
//!
//! Requirements are inputs: the MDA reads them and never writes them. All
//! values are SI (m, m/s, s).

use crate::units;

use super::arrangement::NumberOfEngine;

/// Take-off field length requirement.
#[derive(Debug, Clone, Default)]
pub struct TakeOffReq {
    /// Airport altitude, m
    pub altp: f64,
    /// Temperature shift from ISA, K
    pub disa: f64,
    /// Maximum field length, m
    pub tofl_req: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ApproachReq {
    pub altp: f64,
    pub disa: f64,
    /// Maximum approach speed, m/s
    pub app_speed_req: f64,
}

/// Residual climb speed at a ceiling.
#[derive(Debug, Clone, Default)]
pub struct CeilingReq {
    pub altp: f64,
    pub disa: f64,
    pub mach: f64,
    /// Minimum vertical speed, m/s
    pub vz_req: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OeiCeilingReq {
    pub altp: f64,
    pub disa: f64,
    /// Minimum climb gradient with one engine out, no_dim
    pub path_req: f64,
}

/// Climb from `altp1` at `cas1`, accelerate to `cas2` at `altp2`, then climb
/// to `altp` at `cas2` until the cruise Mach is reached.
#[derive(Debug, Clone, Default)]
pub struct TimeToClimbReq {
    pub altp1: f64,
    pub cas1: f64,
    pub altp2: f64,
    pub cas2: f64,
    pub altp: f64,
    pub disa: f64,
    /// Maximum time, s
    pub ttc_req: f64,
}

/// Everything the design must achieve.
#[derive(Debug, Clone, Default)]
pub struct Requirement {
    pub n_pax_ref: f64,
    /// m
    pub design_range: f64,
    pub cruise_mach: f64,
    /// m
    pub cruise_altp: f64,
    pub cruise_disa: f64,
    /// Range of the cost mission, m
    pub cost_range: f64,
    /// Fuselage slenderness limit
    pub max_body_aspect_ratio: f64,
    pub take_off: TakeOffReq,
    pub approach: ApproachReq,
    pub mcl_ceiling: CeilingReq,
    pub mcr_ceiling: CeilingReq,
    pub oei_ceiling: OeiCeilingReq,
    pub time_to_climb: TimeToClimbReq,
}

impl Requirement {
    /// Top level requirements with operational requirements defaulted from
    /// them.
    pub fn new(n_pax_ref: f64, design_range: f64, cruise_mach: f64, cruise_altp: f64) -> Self {
        Self {
            n_pax_ref,
            design_range,
            cruise_mach,
            cruise_altp,
            cruise_disa: 0.0,
            cost_range: if design_range <= units::m_NM(3500.0) {
                units::m_NM(400.0)
            } else {
                units::m_NM(4000.0)
            },
            max_body_aspect_ratio: 13.4,
            take_off: TakeOffReq {
                altp: 0.0,
                disa: 15.0,
                tofl_req: 2300.0,
            },
            approach: ApproachReq {
                altp: 0.0,
                disa: 0.0,
                app_speed_req: units::mps_kt(137.0),
            },
            mcl_ceiling: CeilingReq {
                altp: cruise_altp,
                disa: 0.0,
                mach: cruise_mach,
                vz_req: units::mps_ftpmin(300.0),
            },
            mcr_ceiling: CeilingReq {
                altp: cruise_altp,
                disa: 0.0,
                mach: cruise_mach,
                vz_req: units::mps_ftpmin(0.0),
            },
            oei_ceiling: OeiCeilingReq {
                altp: units::m_ft(14000.0),
                disa: 0.0,
                path_req: NumberOfEngine::Twin.oei_path_req(),
            },
            time_to_climb: TimeToClimbReq {
                altp1: units::m_ft(1500.0),
                cas1: units::mps_kt(180.0),
                altp2: units::m_ft(10000.0),
                cas2: units::mps_kt(250.0),
                altp: cruise_altp,
                disa: 0.0,
                ttc_req: units::s_min(25.0),
            },
        }
    }
}
