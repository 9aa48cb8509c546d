//! Operational performance outputs.
//!
//! Each `*_req` field mirrors the matching requirement so that constraint
//! expressions can be written entirely in terms of `aircraft.performance.*`.

#[derive(Debug, Clone, Default)]
pub struct TakeOff {
    pub tofl_req: f64,
    /// Take-off field length at MTOW, m
    pub tofl_eff: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Approach {
    pub app_speed_req: f64,
    /// 1.23 Vs1g at MLW, m/s
    pub app_speed_eff: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Ceiling {
    pub vz_req: f64,
    /// Residual vertical speed, m/s
    pub vz_eff: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OeiCeiling {
    pub path_req: f64,
    /// Climb gradient with one engine out
    pub path_eff: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TimeToClimb {
    pub ttc_req: f64,
    /// s
    pub ttc_eff: f64,
}

/// One mission flown at a given range and payload.
#[derive(Debug, Clone, Default)]
pub struct MissionResult {
    pub range: f64,
    pub payload: f64,
    pub tow: f64,
    pub fuel_block: f64,
    pub fuel_reserve: f64,
    /// block + reserve
    pub fuel_total: f64,
    /// s
    pub time_block: f64,
}

/// Cruise characteristics and the two reference missions.
#[derive(Debug, Clone, Default)]
pub struct Mission {
    /// Lift over drag at mid cruise
    pub crz_lod: f64,
    /// kg/N/s
    pub crz_tsfc: f64,
    /// True air speed, m/s
    pub crz_tas: f64,
    /// Design range at nominal payload, flown at MTOW
    pub nominal: MissionResult,
    /// Cost range at nominal payload
    pub cost: MissionResult,
}

#[derive(Debug, Clone, Default)]
pub struct Performance {
    pub take_off: TakeOff,
    pub approach: Approach,
    pub mcl_ceiling: Ceiling,
    pub mcr_ceiling: Ceiling,
    pub oei_ceiling: OeiCeiling,
    pub time_to_climb: TimeToClimb,
    pub mission: Mission,
}
