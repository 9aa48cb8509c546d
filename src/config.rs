//! Study configuration.
//!
//! A study file is TOML. It names the aircraft to build, the MDA settings and
//! any of the three drivers (optimization, exploration, feasibility):
//!
//! ```toml
//! name = "h2_medium_range"
//! mode = "mda_plus"
//!
//! [arrangement]
//! tank_architecture = "rear"
//! fuel_type = "liquid_h2"
//!
//! [requirement]
//! n_pax_ref = 150
//! design_range = 1800      # NM
//! cruise_mach = 0.78
//! cruise_altp = 35000      # ft
//!
//! [settings]
//! "aircraft.airframe.wing.area" = 164
//! ```
//!
//! Requirement and operational values are given in the units aircraft
//! designers quote them in (NM, ft, kt, ft/min, min) and converted to SI when
//! the aircraft is built. `[settings]` values are written verbatim through
//! the parameter accessor and are therefore SI.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address;
use crate::aircraft::{Aircraft, Arrangement, Requirement};
use crate::error::{MdoError, Result};
use crate::explore::{Bound, ConstraintSpec, FieldSpec, GridPolicy};
use crate::expr;
use crate::mda::{MdaMode, MdaSolver, DEFAULT_MAX_PASSES, DEFAULT_SUB_LOOP_PASSES, DEFAULT_TOLERANCE};
use crate::optimize::{Method, DEFAULT_MAX_EVALUATIONS};
use crate::units;

/// A complete study description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Study {
    #[serde(default = "default_name")]
    pub name: String,
    /// MDA coupling strategy for every solve of the study
    #[serde(default)]
    pub mode: MdaMode,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub arrangement: Arrangement,
    pub requirement: RequirementConfig,
    #[serde(default)]
    pub operational: OperationalConfig,
    /// `path = value` assignments applied after the aircraft is built
    #[serde(default)]
    pub settings: BTreeMap<String, f64>,
    pub optimization: Option<OptimizationConfig>,
    pub exploration: Option<ExplorationConfig>,
    pub feasibility: Option<FeasibilityConfig>,
}

fn default_name() -> String {
    "aircraft".to_string()
}

/// MDA solver settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_passes: usize,
    pub tolerance: f64,
    pub sub_loop_passes: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            tolerance: DEFAULT_TOLERANCE,
            sub_loop_passes: DEFAULT_SUB_LOOP_PASSES,
        }
    }
}

impl SolverConfig {
    pub fn mda_solver(&self) -> MdaSolver {
        MdaSolver::new()
            .with_max_passes(self.max_passes)
            .with_tolerance(self.tolerance)
            .with_sub_loop_passes(self.sub_loop_passes)
    }
}

/// Top level requirements.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequirementConfig {
    pub n_pax_ref: f64,
    /// NM
    pub design_range: f64,
    pub cruise_mach: f64,
    /// ft
    pub cruise_altp: f64,
}

/// Operational requirements. Anything left out keeps the value derived from
/// the top level requirements.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OperationalConfig {
    /// m
    pub tofl_req: Option<f64>,
    /// kt
    pub app_speed_req: Option<f64>,
    /// ft/min
    pub mcl_vz_req: Option<f64>,
    /// ft/min
    pub mcr_vz_req: Option<f64>,
    /// ft
    pub oei_altp: Option<f64>,
    /// ft
    pub ttc_altp1: Option<f64>,
    /// kt
    pub ttc_cas1: Option<f64>,
    /// ft
    pub ttc_altp2: Option<f64>,
    /// kt
    pub ttc_cas2: Option<f64>,
    /// min
    pub ttc_req: Option<f64>,
    pub max_body_aspect_ratio: Option<f64>,
}

/// MDF optimization problem.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizationConfig {
    pub variables: Vec<String>,
    /// `[lower, upper]` per variable, SI
    pub bounds: Vec<[f64; 2]>,
    /// Expressions that must stay `>= 0`
    pub constraints: Vec<String>,
    /// One scaling expression per constraint
    pub magnitudes: Vec<String>,
    /// Expression to minimize
    pub criterion: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
}

fn default_max_evaluations() -> usize {
    DEFAULT_MAX_EVALUATIONS
}

impl OptimizationConfig {
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.bounds.iter().map(|b| (b[0], b[1])).collect()
    }

    /// Constraints and their magnitudes with repeated constraints dropped.
    ///
    /// A constraint listed twice would only double its penalty weight.
    pub fn unique_constraints(&self) -> (Vec<String>, Vec<String>) {
        let mut seen = HashSet::new();
        let mut constraints = Vec::new();
        let mut magnitudes = Vec::new();
        for (c, m) in self.constraints.iter().zip(&self.magnitudes) {
            if seen.insert(c.trim()) {
                constraints.push(c.clone());
                magnitudes.push(m.clone());
            } else {
                warn!(constraint = %c, "dropping repeated constraint");
            }
        }
        (constraints, magnitudes)
    }
}

/// Grid sweep.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExplorationConfig {
    pub variables: Vec<String>,
    /// Relative step per variable
    pub steps: Vec<f64>,
    #[serde(default = "default_points_per_side")]
    pub points_per_side: usize,
    /// Table file to write
    pub output: PathBuf,
    /// `[label, unit, format, expression]` per recorded field
    pub data: Vec<[String; 4]>,
}

fn default_points_per_side() -> usize {
    1
}

impl ExplorationConfig {
    pub fn policy(&self) -> GridPolicy {
        GridPolicy::new(self.points_per_side)
    }

    pub fn fields(&self) -> Result<Vec<FieldSpec>> {
        self.data
            .iter()
            .map(|[label, unit, format, expression]| FieldSpec::new(label, unit, format, expression))
            .collect()
    }
}

/// Feasibility map of an experiment table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeasibilityConfig {
    /// Objective label
    pub field: String,
    /// Extra labels to report
    #[serde(default)]
    pub other: Vec<String>,
    /// Axis labels, defaults to the leading data labels of the exploration
    #[serde(default)]
    pub axes: Vec<String>,
    pub constraints: Vec<LimitConfig>,
}

/// One limit, its value given as an expression on the converged aircraft.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitConfig {
    pub field: String,
    pub bound: Bound,
    pub limit: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "black".to_string()
}

impl FeasibilityConfig {
    /// Evaluate every limit expression against `aircraft`.
    pub fn specs(&self, aircraft: &Aircraft) -> Result<Vec<ConstraintSpec>> {
        self.constraints
            .iter()
            .map(|c| {
                Ok(ConstraintSpec {
                    field: c.field.clone(),
                    bound: c.bound,
                    limit: expr::eval(aircraft, &c.limit)?,
                    color: c.color.clone(),
                })
            })
            .collect()
    }
}

impl Study {
    /// Read, decode and validate a study file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MdoError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Decode and validate study text. `origin` names the source in errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let study: Study = toml::from_str(text).map_err(|e| MdoError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        study.validate()?;
        Ok(study)
    }

    /// Structural checks that need no aircraft.
    pub fn validate(&self) -> Result<()> {
        let s = &self.solver;
        if s.max_passes == 0 || s.sub_loop_passes == 0 {
            return Err(MdoError::config("solver pass counts must be at least 1"));
        }
        if !(s.tolerance.is_finite() && s.tolerance > 0.0) {
            return Err(MdoError::config(format!("solver tolerance must be positive, got {}", s.tolerance)));
        }

        let r = &self.requirement;
        for (name, value) in [
            ("n_pax_ref", r.n_pax_ref),
            ("design_range", r.design_range),
            ("cruise_mach", r.cruise_mach),
            ("cruise_altp", r.cruise_altp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MdoError::config(format!("requirement {} must be positive, got {}", name, value)));
            }
        }

        if let Some((path, value)) = self.settings.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MdoError::config(format!("setting '{}' is not finite ({})", path, value)));
        }

        if let Some(opt) = &self.optimization {
            if opt.variables.is_empty() {
                return Err(MdoError::config("optimization needs at least one variable"));
            }
            if opt.bounds.len() != opt.variables.len() {
                return Err(MdoError::config(format!(
                    "{} variables but {} bounds",
                    opt.variables.len(),
                    opt.bounds.len()
                )));
            }
            if let Some((var, b)) = opt
                .variables
                .iter()
                .zip(&opt.bounds)
                .find(|(_, b)| !(b[0].is_finite() && b[1].is_finite() && b[0] < b[1]))
            {
                return Err(MdoError::config(format!(
                    "bounds of '{}' must satisfy lower < upper, got [{}, {}]",
                    var, b[0], b[1]
                )));
            }
            if opt.constraints.len() != opt.magnitudes.len() {
                return Err(MdoError::config(format!(
                    "{} constraints but {} magnitudes",
                    opt.constraints.len(),
                    opt.magnitudes.len()
                )));
            }
            if opt.criterion.trim().is_empty() {
                return Err(MdoError::config("optimization criterion is empty"));
            }
            if opt.max_evaluations == 0 {
                return Err(MdoError::config("max_evaluations must be at least 1"));
            }
        }

        if let Some(exp) = &self.exploration {
            if exp.variables.is_empty() {
                return Err(MdoError::config("exploration needs at least one variable"));
            }
            if exp.steps.len() != exp.variables.len() {
                return Err(MdoError::config(format!(
                    "{} variables but {} steps",
                    exp.variables.len(),
                    exp.steps.len()
                )));
            }
            if exp.points_per_side == 0 {
                return Err(MdoError::config("points_per_side must be at least 1"));
            }
            if exp.data.is_empty() {
                return Err(MdoError::config("exploration records no data"));
            }
            exp.fields()?;
        }

        if let Some(feas) = &self.feasibility {
            if feas.constraints.is_empty() {
                return Err(MdoError::config("feasibility lists no constraints"));
            }
        }
        Ok(())
    }

    /// Requirements in SI with the operational overrides applied.
    pub fn requirement(&self) -> Requirement {
        let r = &self.requirement;
        let mut req = Requirement::new(
            r.n_pax_ref,
            units::m_NM(r.design_range),
            r.cruise_mach,
            units::m_ft(r.cruise_altp),
        );

        let op = &self.operational;
        if let Some(v) = op.tofl_req {
            req.take_off.tofl_req = v;
        }
        if let Some(v) = op.app_speed_req {
            req.approach.app_speed_req = units::mps_kt(v);
        }
        if let Some(v) = op.mcl_vz_req {
            req.mcl_ceiling.vz_req = units::mps_ftpmin(v);
        }
        if let Some(v) = op.mcr_vz_req {
            req.mcr_ceiling.vz_req = units::mps_ftpmin(v);
        }
        if let Some(v) = op.oei_altp {
            req.oei_ceiling.altp = units::m_ft(v);
        }
        if let Some(v) = op.ttc_altp1 {
            req.time_to_climb.altp1 = units::m_ft(v);
        }
        if let Some(v) = op.ttc_cas1 {
            req.time_to_climb.cas1 = units::mps_kt(v);
        }
        if let Some(v) = op.ttc_altp2 {
            req.time_to_climb.altp2 = units::m_ft(v);
        }
        if let Some(v) = op.ttc_cas2 {
            req.time_to_climb.cas2 = units::mps_kt(v);
        }
        if let Some(v) = op.ttc_req {
            req.time_to_climb.ttc_req = units::s_min(v);
        }
        if let Some(v) = op.max_body_aspect_ratio {
            req.max_body_aspect_ratio = v;
        }
        req
    }

    /// Build the aircraft and apply `[settings]`. No MDA is run.
    pub fn build_aircraft(&self) -> Result<Aircraft> {
        let mut aircraft = Aircraft::new(self.name.clone(), self.arrangement, self.requirement())?;
        for (path, &value) in &self.settings {
            address::set(&mut aircraft, path, value)?;
            debug!(%path, value, "setting applied");
        }
        Ok(aircraft)
    }

    /// The `[optimization]` section, required by the optimize command.
    pub fn optimization(&self) -> Result<&OptimizationConfig> {
        self.optimization
            .as_ref()
            .ok_or_else(|| MdoError::config("study has no [optimization] section"))
    }

    pub fn exploration(&self) -> Result<&ExplorationConfig> {
        self.exploration
            .as_ref()
            .ok_or_else(|| MdoError::config("study has no [exploration] section"))
    }

    pub fn feasibility(&self) -> Result<&FeasibilityConfig> {
        self.feasibility
            .as_ref()
            .ok_or_else(|| MdoError::config("study has no [feasibility] section"))
    }

    /// Axis labels for the feasibility map.
    pub fn feasibility_axes(&self) -> Result<Vec<String>> {
        let feas = self.feasibility()?;
        if !feas.axes.is_empty() {
            return Ok(feas.axes.clone());
        }
        let exp = self.exploration()?;
        Ok(exp
            .data
            .iter()
            .take(exp.variables.len())
            .map(|d| d[0].clone())
            .collect())
    }
}
