//! Numerical constrained solver interface and shared penalty machinery.

use std::fmt;

use super::{DEFAULT_MAX_EVALUATIONS, FEASIBILITY_TOLERANCE};

/// Objective and constraint values at one candidate point.
///
/// Constraints follow the `>= 0` convention: a point is feasible when every
/// constraint is non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub objective: f64,
    pub constraints: Vec<f64>,
}

impl Evaluation {
    /// Sum of squared constraint violations. Non-finite constraints count as
    /// infinitely violated.
    pub fn violation(&self) -> f64 {
        self.constraints
            .iter()
            .map(|&c| {
                if c.is_finite() {
                    c.min(0.0).powi(2)
                } else {
                    f64::INFINITY
                }
            })
            .sum()
    }

    /// Whether every constraint is satisfied within [`FEASIBILITY_TOLERANCE`].
    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|&c| c >= -FEASIBILITY_TOLERANCE)
    }

    /// Quadratic exterior penalty merit. Non-finite values map to +inf.
    pub fn merit(&self, weight: f64) -> f64 {
        let m = self.objective + weight * self.violation();
        if m.is_finite() {
            m
        } else {
            f64::INFINITY
        }
    }

    /// Ranking used to keep the best point seen: feasible beats infeasible,
    /// then lower objective (feasible) or lower violation (infeasible).
    pub fn is_better_than(&self, other: &Evaluation) -> bool {
        match (self.is_feasible(), other.is_feasible()) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                self.objective < other.objective || (other.objective.is_nan() && !self.objective.is_nan())
            }
            (false, false) => self.violation() < other.violation(),
        }
    }
}

/// Why the numerical solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Step/simplex size fell below tolerance at a feasible point
    Converged,
    /// The evaluation budget ran out
    EvaluationLimit,
    /// Search settled but no feasible point was found
    Infeasible,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::EvaluationLimit => write!(f, "evaluation limit reached"),
            Self::Infeasible => write!(f, "no feasible point found"),
        }
    }
}

/// Result returned by a [`ConstrainedSolver`].
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// Best point found (inside the bounds)
    pub x: Vec<f64>,
    /// Values at `x`
    pub evaluation: Evaluation,
    /// Number of calls made to the objective/constraint callback
    pub evaluations: usize,
    pub status: SolverStatus,
}

/// A general bound-constrained nonlinear solver with inequality constraints.
///
/// Implementations must only ever call `f` with points inside `bounds`.
pub trait ConstrainedSolver {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Minimize the objective returned by `f` subject to its constraints.
    fn minimize(
        &self,
        f: &mut dyn FnMut(&[f64]) -> Evaluation,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> SolverOutcome;
}

/// Sequential exterior penalty settings.
///
/// The inner search is restarted from the previous result with the penalty
/// weight multiplied by `growth`, `stages` times in total.
#[derive(Debug, Clone)]
pub struct PenaltySettings {
    pub initial_weight: f64,
    pub growth: f64,
    pub stages: usize,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self {
            initial_weight: 10.0,
            growth: 10.0,
            stages: 4,
        }
    }
}

/// Clip `x` into `bounds`.
pub fn project(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(bounds)
        .map(|(&v, &(lo, hi))| if v.is_nan() { lo } else { v.clamp(lo, hi) })
        .collect()
}

/// Wraps the user callback: projects candidates into the bounds, counts
/// evaluations against the budget and remembers the best point seen.
pub(crate) struct Tracker<'a> {
    f: &'a mut dyn FnMut(&[f64]) -> Evaluation,
    bounds: &'a [(f64, f64)],
    max_evaluations: usize,
    evaluations: usize,
    best: Option<(Vec<f64>, Evaluation)>,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(
        f: &'a mut dyn FnMut(&[f64]) -> Evaluation,
        bounds: &'a [(f64, f64)],
        max_evaluations: usize,
    ) -> Self {
        Self {
            f,
            bounds,
            max_evaluations: if max_evaluations == 0 { DEFAULT_MAX_EVALUATIONS } else { max_evaluations },
            evaluations: 0,
            best: None,
        }
    }

    pub(crate) fn bounds(&self) -> &[(f64, f64)] {
        self.bounds
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.evaluations >= self.max_evaluations
    }

    /// Evaluate the penalised merit at the projection of `x`.
    pub(crate) fn merit(&mut self, x: &[f64], weight: f64) -> (Vec<f64>, f64) {
        let x = project(x, self.bounds);
        let evaluation = (self.f)(&x);
        self.evaluations += 1;
        let merit = evaluation.merit(weight);

        let replace = match &self.best {
            None => true,
            Some((_, best)) => evaluation.is_better_than(best),
        };
        if replace {
            self.best = Some((x.clone(), evaluation));
        }
        (x, merit)
    }

    pub(crate) fn finish(self, x0: &[f64], search_converged: bool) -> SolverOutcome {
        let exhausted = self.exhausted();
        let (x, evaluation) = self.best.unwrap_or_else(|| {
            (
                project(x0, self.bounds),
                Evaluation {
                    objective: f64::NAN,
                    constraints: Vec::new(),
                },
            )
        });
        let status = if !evaluation.is_feasible() {
            if exhausted {
                SolverStatus::EvaluationLimit
            } else {
                SolverStatus::Infeasible
            }
        } else if search_converged {
            SolverStatus::Converged
        } else {
            SolverStatus::EvaluationLimit
        };
        SolverOutcome {
            x,
            evaluation,
            evaluations: self.evaluations,
            status,
        }
    }
}

/// Width of a bound interval, falling back to a unit scale when unbounded.
pub(crate) fn span(lo: f64, hi: f64) -> f64 {
    let w = hi - lo;
    if w.is_finite() && w > 0.0 {
        w
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(objective: f64, constraints: &[f64]) -> Evaluation {
        Evaluation {
            objective,
            constraints: constraints.to_vec(),
        }
    }

    #[test]
    fn test_violation_and_merit() {
        let e = eval(1.0, &[0.5, -0.2, -0.1]);
        assert!((e.violation() - 0.05).abs() < 1e-12);
        assert!((e.merit(100.0) - 6.0).abs() < 1e-9);
        assert!(!e.is_feasible());
        assert_eq!(eval(f64::NAN, &[]).merit(1.0), f64::INFINITY);
        assert_eq!(eval(1.0, &[f64::NAN]).violation(), f64::INFINITY);
    }

    #[test]
    fn test_ranking() {
        let feasible_high = eval(10.0, &[0.1]);
        let feasible_low = eval(5.0, &[0.0]);
        let infeasible_low = eval(1.0, &[-0.5]);
        let infeasible_lower_violation = eval(2.0, &[-0.1]);

        assert!(feasible_low.is_better_than(&feasible_high));
        assert!(feasible_high.is_better_than(&infeasible_low));
        assert!(!infeasible_low.is_better_than(&feasible_high));
        assert!(infeasible_lower_violation.is_better_than(&infeasible_low));
    }

    #[test]
    fn test_project() {
        let bounds = [(0.0, 1.0), (-2.0, 2.0)];
        assert_eq!(project(&[1.5, -3.0], &bounds), vec![1.0, -2.0]);
        assert_eq!(project(&[f64::NAN, 0.5], &bounds), vec![0.0, 0.5]);
    }
}
