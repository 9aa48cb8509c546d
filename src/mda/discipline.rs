//! Disciplines and their coupling order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MdoError;

/// One coupled subsystem model.
///
/// A discipline recomputes its own derived fields from the current state and
/// reports how far the state is from being self-consistent. Disciplines are
/// opaque to the solver: it only knows the order to call them in.
pub trait Discipline<S> {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Recompute this discipline's outputs from the current state.
    fn update(&self, state: &mut S);

    /// Signed consistency gap, normalised so that it is compared directly
    /// against the solver tolerance. Zero at consistency.
    fn eval_residual(&self, _state: &S) -> f64 {
        0.0
    }
}

/// One entry of a coupling schedule.
pub enum Stage<S> {
    /// A single `update()` call.
    Step(Box<dyn Discipline<S>>),
    /// A sub-loop iterated on its own until its residuals settle.
    Loop {
        label: &'static str,
        disciplines: Vec<Box<dyn Discipline<S>>>,
    },
}

/// Fixed ordered sequence of disciplines for one MDA mode.
pub struct Schedule<S> {
    stages: Vec<Stage<S>>,
}

impl<S> Default for Schedule<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Schedule<S> {
    /// Create an empty schedule.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a single discipline.
    pub fn step(mut self, discipline: impl Discipline<S> + 'static) -> Self {
        self.stages.push(Stage::Step(Box::new(discipline)));
        self
    }

    /// Append a sub-loop over several disciplines.
    pub fn sub_loop(mut self, label: &'static str, disciplines: Vec<Box<dyn Discipline<S>>>) -> Self {
        self.stages.push(Stage::Loop { label, disciplines });
        self
    }

    /// Stages in call order.
    pub fn stages(&self) -> &[Stage<S>] {
        &self.stages
    }

    /// Every distinct discipline (by name), in first-appearance order.
    pub fn disciplines(&self) -> Vec<&dyn Discipline<S>> {
        let mut out: Vec<&dyn Discipline<S>> = Vec::new();
        for stage in &self.stages {
            let members = match stage {
                Stage::Step(d) => std::slice::from_ref(d),
                Stage::Loop { disciplines, .. } => disciplines.as_slice(),
            };
            for d in members {
                if !out.iter().any(|seen| seen.name() == d.name()) {
                    out.push(d.as_ref());
                }
            }
        }
        out
    }

    /// Names of the stages, sub-loops shown as `label[a, b]`.
    pub fn describe(&self) -> String {
        self.stages
            .iter()
            .map(|stage| match stage {
                Stage::Step(d) => d.name().to_string(),
                Stage::Loop { label, disciplines } => {
                    let inner: Vec<_> = disciplines.iter().map(|d| d.name()).collect();
                    format!("{}[{}]", label, inner.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Coupling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MdaMode {
    /// Basic fixed-order pass.
    #[default]
    Mda,
    /// Fixed-order pass preceded by sub-loops for slow couplings.
    MdaPlus,
}

impl FromStr for MdaMode {
    type Err = MdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mda" => Ok(Self::Mda),
            "mda_plus" => Ok(Self::MdaPlus),
            other => Err(MdoError::config(format!(
                "unknown MDA mode '{}' (expected 'mda' or 'mda_plus')",
                other
            ))),
        }
    }
}

impl fmt::Display for MdaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mda => write!(f, "mda"),
            Self::MdaPlus => write!(f, "mda_plus"),
        }
    }
}

/// A state type that knows its own coupling schedules.
pub trait Coupled: Sized {
    /// The discipline order for `mode`.
    fn schedule(mode: MdaMode) -> Schedule<Self>;
}
