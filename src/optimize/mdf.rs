//! MDF problem: every evaluation goes through a converged MDA.

use tracing::{info, trace, warn};

use super::solver::{ConstrainedSolver, Evaluation, SolverStatus};
use crate::address::{Addressable, Field};
use crate::error::{MdoError, Result};
use crate::expr::Expression;
use crate::mda::{Coupled, MdaMode, MdaSolver};

/// One candidate evaluated during a run.
#[derive(Debug, Clone)]
pub struct ComputedPoint {
    /// Design variable values (physical units)
    pub x: Vec<f64>,
    /// Objective value (unscaled)
    pub objective: f64,
    /// Constraint values divided by their magnitudes
    pub constraints: Vec<f64>,
    /// Whether the MDA converged at this point
    pub converged: bool,
}

/// Outcome of an MDF optimization.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Design variable paths, in input order
    pub variables: Vec<String>,
    /// Optimum design vector (physical units)
    pub x: Vec<f64>,
    /// Objective at the optimum (unscaled)
    pub objective: f64,
    /// Scaled constraint values at the optimum (`>= 0` is satisfied)
    pub constraints: Vec<f64>,
    pub feasible: bool,
    /// Number of MDA-backed evaluations performed
    pub evaluations: usize,
    pub status: SolverStatus,
    /// Every candidate in evaluation order
    pub computed_points: Vec<ComputedPoint>,
}

/// A validated, compiled MDF problem over state type `S`.
///
/// All paths are resolved and all expressions compiled in [`MdfProblem::new`],
/// so configuration mistakes surface before any MDA is run.
pub struct MdfProblem<S> {
    variables: Vec<String>,
    fields: Vec<Field<S>>,
    bounds: Vec<(f64, f64)>,
    constraints: Vec<Expression<S>>,
    magnitudes: Vec<Expression<S>>,
    objective: Expression<S>,
    mode: MdaMode,
    mda: MdaSolver,
}

impl<S: Addressable + Coupled> MdfProblem<S> {
    /// Validate and compile a problem definition.
    ///
    /// `bounds[i]` is `(lo, hi)` for `variables[i]`; `magnitudes[i]` is the
    /// expression (often a literal) whose value normalises `constraints[i]`.
    pub fn new(
        variables: &[String],
        bounds: &[(f64, f64)],
        constraints: &[String],
        magnitudes: &[String],
        objective: &str,
    ) -> Result<Self> {
        if variables.is_empty() {
            return Err(MdoError::config("no design variables given"));
        }
        if variables.len() != bounds.len() {
            return Err(MdoError::config(format!(
                "{} design variables but {} bounds",
                variables.len(),
                bounds.len()
            )));
        }
        if constraints.len() != magnitudes.len() {
            return Err(MdoError::config(format!(
                "{} constraints but {} constraint magnitudes",
                constraints.len(),
                magnitudes.len()
            )));
        }
        for (path, &(lo, hi)) in variables.iter().zip(bounds) {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(MdoError::config(format!(
                    "bounds of '{}' must be finite with lo < hi, got [{}, {}]",
                    path, lo, hi
                )));
            }
        }

        let registry = S::registry();
        let fields = variables
            .iter()
            .map(|p| registry.resolve(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            variables: variables.to_vec(),
            fields,
            bounds: bounds.to_vec(),
            constraints: Expression::compile_all(constraints)?,
            magnitudes: Expression::compile_all(magnitudes)?,
            objective: Expression::compile(objective)?,
            mode: MdaMode::default(),
            mda: MdaSolver::default(),
        })
    }

    /// Choose the MDA coupling used at each evaluation.
    pub fn with_mode(mut self, mode: MdaMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the MDA solver settings used at each evaluation.
    pub fn with_mda_solver(mut self, mda: MdaSolver) -> Self {
        self.mda = mda;
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Run the optimization from the state's current design.
    ///
    /// The state is left at the last evaluated candidate, which is not
    /// necessarily the optimum.
    pub fn solve(&self, state: &mut S, solver: &dyn ConstrainedSolver) -> Result<OptimizationResult> {
        let schedule = S::schedule(self.mode);

        // Starting point, clipped into the box
        let start: Vec<f64> = self
            .fields
            .iter()
            .zip(&self.bounds)
            .map(|(field, &(lo, hi))| {
                let v = (field.get)(state);
                if v.is_finite() {
                    v.clamp(lo, hi)
                } else {
                    lo
                }
            })
            .collect();
        self.apply(state, &start);
        let report = self.mda.solve(state, &schedule);
        if !report.converged {
            warn!("initial MDA did not converge, scaling from a best-effort state");
        }

        let magnitudes = self
            .magnitudes
            .iter()
            .map(|m| {
                let v = m.eval(state).abs();
                if v.is_finite() && v > 0.0 {
                    Ok(v)
                } else {
                    Err(MdoError::config(format!(
                        "constraint magnitude '{}' evaluates to {}",
                        m.text(),
                        v
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let reference = {
            let v = self.objective.eval(state).abs();
            if v.is_finite() && v > 0.0 {
                v
            } else {
                1.0
            }
        };
        info!(
            solver = solver.name(),
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            reference,
            "starting MDF optimization"
        );

        let unit_box = vec![(0.0, 1.0); self.bounds.len()];
        let u0: Vec<f64> = start
            .iter()
            .zip(&self.bounds)
            .map(|(v, &(lo, hi))| (v - lo) / (hi - lo))
            .collect();

        let mut history = Vec::new();
        let outcome = {
            let mut evaluate = |u: &[f64]| -> Evaluation {
                let x = self.to_physical(u);
                self.apply(state, &x);
                let report = self.mda.solve(state, &schedule);

                let objective = self.objective.eval(state);
                let constraints: Vec<f64> = self
                    .constraints
                    .iter()
                    .zip(&magnitudes)
                    .map(|(c, m)| c.eval(state) / m)
                    .collect();
                trace!(?x, objective, ?constraints, converged = report.converged, "MDF evaluation");

                history.push(ComputedPoint {
                    x,
                    objective,
                    constraints: constraints.clone(),
                    converged: report.converged,
                });
                Evaluation {
                    objective: objective / reference,
                    constraints,
                }
            };
            solver.minimize(&mut evaluate, &u0, &unit_box)
        };

        let feasible = outcome.evaluation.is_feasible();
        let result = OptimizationResult {
            variables: self.variables.clone(),
            x: self.to_physical(&outcome.x),
            objective: outcome.evaluation.objective * reference,
            constraints: outcome.evaluation.constraints,
            feasible,
            evaluations: outcome.evaluations,
            status: outcome.status,
            computed_points: history,
        };
        info!(
            evaluations = result.evaluations,
            objective = result.objective,
            feasible,
            status = %result.status,
            "MDF optimization finished"
        );
        Ok(result)
    }

    fn apply(&self, state: &mut S, x: &[f64]) {
        for (field, &v) in self.fields.iter().zip(x) {
            (field.set)(state, v);
        }
    }

    fn to_physical(&self, u: &[f64]) -> Vec<f64> {
        u.iter()
            .zip(&self.bounds)
            .map(|(t, &(lo, hi))| (lo + t * (hi - lo)).clamp(lo, hi))
            .collect()
    }
}
