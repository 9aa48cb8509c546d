//! Constrained optimization in the MDF formulation.
//!
//! For each candidate design vector the optimizer writes the design variables
//! through the parameter accessor, converges an MDA, then evaluates the
//! objective and constraint expressions. The numerical search itself is a
//! black box behind [`ConstrainedSolver`].
//!
//! Conventions:
//! - constraints are satisfied when `>= 0`
//! - each constraint is divided by its magnitude, evaluated once at the
//!   starting point, so the solver sees values of order one
//! - design variables reach the solver normalised to `[0, 1]`
//! - the objective is divided by its value at the starting point
//!
//! An MDA that fails to converge at a candidate does not stop the run; the
//! candidate is scored from the best-effort state and flagged in
//! [`OptimizationResult::computed_points`].

mod compass;
mod mdf;
mod nelder_mead;
mod solver;

pub use compass::CompassSearch;
pub use mdf::{ComputedPoint, MdfProblem, OptimizationResult};
pub use nelder_mead::NelderMead;
pub use solver::{project, ConstrainedSolver, Evaluation, PenaltySettings, SolverOutcome, SolverStatus};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Addressable;
use crate::error::{MdoError, Result};
use crate::mda::Coupled;

/// Default evaluation budget of the built-in solvers.
pub const DEFAULT_MAX_EVALUATIONS: usize = 200;

/// Scaled constraint values down to `-FEASIBILITY_TOLERANCE` count as satisfied.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-4;

/// Built-in numerical solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    NelderMead,
    Compass,
}

impl Method {
    /// Instantiate the solver with the given evaluation budget.
    pub fn build(self, max_evaluations: usize) -> Box<dyn ConstrainedSolver> {
        match self {
            Self::NelderMead => Box::new(NelderMead::new().with_max_evaluations(max_evaluations)),
            Self::Compass => Box::new(CompassSearch::new().with_max_evaluations(max_evaluations)),
        }
    }
}

impl FromStr for Method {
    type Err = MdoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "nelder_mead" | "simplex" => Ok(Self::NelderMead),
            "compass" => Ok(Self::Compass),
            other => Err(MdoError::config(format!("unknown optimization method '{}'", other))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NelderMead => write!(f, "nelder_mead"),
            Self::Compass => write!(f, "compass"),
        }
    }
}

/// Optimize `objective` over `variables` subject to `constraints >= 0`,
/// using the default MDA settings.
///
/// Fails with [`MdoError::Config`] (or an address/expression error) before any
/// MDA runs if the inputs are inconsistent.
pub fn optimize<S: Addressable + Coupled>(
    state: &mut S,
    variables: &[String],
    bounds: &[(f64, f64)],
    constraints: &[String],
    magnitudes: &[String],
    objective: &str,
    solver: &dyn ConstrainedSolver,
) -> Result<OptimizationResult> {
    MdfProblem::new(variables, bounds, constraints, magnitudes, objective)?.solve(state, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Registry;
    use crate::mda::{Discipline, MdaMode, MdaSolver, Schedule};
    use approx::assert_abs_diff_eq;
    use once_cell::sync::Lazy;

    /// f = (x - 3)^2, g = 2.5 - x
    #[derive(Debug, Default, Clone)]
    struct Toy {
        x: f64,
        f: f64,
        g: f64,
        noise: f64,
        mda_runs: f64,
    }

    static TOY_FIELDS: Lazy<Registry<Toy>> = Lazy::new(|| {
        let mut reg: Registry<Toy> = Registry::new("toy");
        crate::fields!(reg, Toy, "toy"; x, f, g, noise, mda_runs);
        reg
    });

    impl Addressable for Toy {
        fn registry() -> &'static Registry<Self> {
            &TOY_FIELDS
        }
    }

    struct Model;
    struct Jitter;

    impl Discipline<Toy> for Model {
        fn name(&self) -> &'static str {
            "model"
        }
        fn update(&self, s: &mut Toy) {
            s.f = (s.x - 3.0).powi(2);
            s.g = 2.5 - s.x;
            s.mda_runs += 1.0;
        }
    }

    impl Discipline<Toy> for Jitter {
        fn name(&self) -> &'static str {
            "jitter"
        }
        fn update(&self, s: &mut Toy) {
            s.noise = 1.0 - s.noise;
        }
        fn eval_residual(&self, _s: &Toy) -> f64 {
            1.0
        }
    }

    impl Coupled for Toy {
        fn schedule(mode: MdaMode) -> Schedule<Self> {
            match mode {
                MdaMode::Mda => Schedule::new().step(Model),
                MdaMode::MdaPlus => Schedule::new().step(Model).step(Jitter),
            }
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bound_active_optimum_never_leaves_bounds() {
        let mut toy = Toy { x: 1.0, ..Default::default() };
        let result = optimize(
            &mut toy,
            &strings(&["toy.x"]),
            &[(0.0, 2.0)],
            &[],
            &[],
            "toy.f",
            &NelderMead::new(),
        )
        .unwrap();

        assert!(result.computed_points.iter().all(|p| (0.0..=2.0).contains(&p.x[0])));
        assert_eq!(result.computed_points.len(), result.evaluations);
        assert_abs_diff_eq!(result.x[0], 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.objective, 1.0, epsilon = 1e-2);
        assert!(result.feasible);
    }

    #[test]
    fn test_constraint_active_optimum() {
        let mut toy = Toy { x: 1.0, ..Default::default() };
        let result = optimize(
            &mut toy,
            &strings(&["toy.x"]),
            &[(0.0, 5.0)],
            &strings(&["toy.g"]),
            &strings(&["1"]),
            "toy.f",
            &CompassSearch::new().with_max_evaluations(400),
        )
        .unwrap();

        assert!(result.feasible);
        assert_abs_diff_eq!(result.x[0], 2.5, epsilon = 1e-2);
        assert_eq!(result.constraints.len(), 1);
        assert!(result.computed_points.iter().all(|p| p.converged));
        assert!(result.computed_points.iter().all(|p| (0.0..=5.0).contains(&p.x[0])));
        assert_eq!(result.computed_points.len(), result.evaluations);
        assert!(result.evaluations <= 400);
    }

    #[test]
    fn test_length_mismatch_fails_before_any_mda() {
        let mut toy = Toy::default();
        let err = optimize(
            &mut toy,
            &strings(&["toy.x", "toy.noise"]),
            &[(0.0, 1.0)],
            &[],
            &[],
            "toy.f",
            &NelderMead::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MdoError::Config { .. }));

        let err = optimize(
            &mut toy,
            &strings(&["toy.x"]),
            &[(0.0, 1.0)],
            &strings(&["toy.g", "toy.f"]),
            &strings(&["1"]),
            "toy.f",
            &NelderMead::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MdoError::Config { .. }));
        assert_eq!(toy.mda_runs, 0.0);
    }

    #[test]
    fn test_bad_expressions_fail_before_any_mda() {
        let mut toy = Toy::default();
        let vars = strings(&["toy.x"]);
        let bounds = [(0.0, 1.0)];
        let solver = NelderMead::new();

        let err = optimize(&mut toy, &vars, &bounds, &strings(&["toy.h"]), &strings(&["1"]), "toy.f", &solver);
        assert!(matches!(err, Err(MdoError::Address { .. })));
        let err = optimize(&mut toy, &vars, &bounds, &[], &[], "open(1)", &solver);
        assert!(matches!(err, Err(MdoError::Evaluation { .. })));
        let err = optimize(&mut toy, &vars, &[(1.0, 0.0)], &[], &[], "toy.f", &solver);
        assert!(matches!(err, Err(MdoError::Config { .. })));
        assert_eq!(toy.mda_runs, 0.0);
    }

    #[test]
    fn test_non_converging_mda_still_yields_result() {
        let mut toy = Toy { x: 1.0, ..Default::default() };
        let problem = MdfProblem::new(&strings(&["toy.x"]), &[(0.0, 2.0)], &[], &[], "toy.f")
            .unwrap()
            .with_mode(MdaMode::MdaPlus)
            .with_mda_solver(MdaSolver::new().with_max_passes(3));
        let result = problem
            .solve(&mut toy, &NelderMead::new().with_max_evaluations(40))
            .unwrap();

        assert!(result.evaluations > 0);
        assert!(result.computed_points.iter().all(|p| !p.converged));
        assert!(result.objective.is_finite());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("nelder-mead".parse::<Method>().unwrap(), Method::NelderMead);
        assert_eq!("compass".parse::<Method>().unwrap(), Method::Compass);
        assert!("slsqp".parse::<Method>().is_err());
        assert_eq!(Method::Compass.build(10).name(), "compass");
    }
}
