//! Coordinate pattern (compass) search under a sequential penalty.

use tracing::debug;

use super::solver::{project, span, ConstrainedSolver, Evaluation, PenaltySettings, SolverOutcome, Tracker};
use super::DEFAULT_MAX_EVALUATIONS;

/// Polls `x +/- step * e_i` along every coordinate, moves to the first
/// improvement and halves the step when none is found.
///
/// Slower than the simplex but very robust on kinked penalty landscapes.
#[derive(Debug, Clone)]
pub struct CompassSearch {
    pub max_evaluations: usize,
    /// Initial step as a fraction of each bound interval
    pub initial_step: f64,
    /// Stop once the step falls below this fraction
    pub min_step: f64,
    pub penalty: PenaltySettings,
}

impl Default for CompassSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl CompassSearch {
    pub fn new() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            initial_step: 0.25,
            min_step: 1e-5,
            penalty: PenaltySettings::default(),
        }
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations.max(1);
        self
    }

    pub fn with_steps(mut self, initial_step: f64, min_step: f64) -> Self {
        self.initial_step = initial_step;
        self.min_step = min_step;
        self
    }

    pub fn with_penalty(mut self, penalty: PenaltySettings) -> Self {
        self.penalty = penalty;
        self
    }

    fn search(&self, tracker: &mut Tracker<'_>, x0: &[f64], weight: f64) -> (Vec<f64>, bool) {
        let widths: Vec<f64> = tracker.bounds().iter().map(|&(lo, hi)| span(lo, hi)).collect();
        let (mut x, mut fx) = tracker.merit(x0, weight);
        let mut step = self.initial_step;

        while step >= self.min_step {
            let mut improved = false;
            'poll: for i in 0..x.len() {
                for sign in [1.0, -1.0] {
                    if tracker.exhausted() {
                        return (x, false);
                    }
                    let mut y = x.clone();
                    y[i] += sign * step * widths[i];
                    let y = project(&y, tracker.bounds());
                    if y == x {
                        continue;
                    }
                    let (y, fy) = tracker.merit(&y, weight);
                    if fy < fx {
                        x = y;
                        fx = fy;
                        improved = true;
                        break 'poll;
                    }
                }
            }
            if !improved {
                step *= 0.5;
            }
        }
        (x, true)
    }
}

impl ConstrainedSolver for CompassSearch {
    fn name(&self) -> &'static str {
        "compass"
    }

    fn minimize(
        &self,
        f: &mut dyn FnMut(&[f64]) -> Evaluation,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> SolverOutcome {
        let mut tracker = Tracker::new(f, bounds, self.max_evaluations);
        let mut x = project(x0, bounds);
        let mut weight = self.penalty.initial_weight;
        let mut converged = false;

        for stage in 0..self.penalty.stages.max(1) {
            let (next, ok) = self.search(&mut tracker, &x, weight);
            debug!(stage, weight, converged = ok, "compass stage finished");
            x = next;
            converged = ok;
            if tracker.exhausted() {
                break;
            }
            weight *= self.penalty.growth;
        }

        tracker.finish(x0, converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::SolverStatus;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_active_constraint_in_two_dimensions() {
        // min x^2 + y^2 s.t. x + y >= 1, optimum (0.5, 0.5)
        let mut f = |x: &[f64]| Evaluation {
            objective: x[0] * x[0] + x[1] * x[1],
            constraints: vec![x[0] + x[1] - 1.0],
        };
        let outcome = CompassSearch::new()
            .with_max_evaluations(2000)
            .minimize(&mut f, &[1.0, 1.0], &[(-2.0, 2.0), (-2.0, 2.0)]);

        assert!(outcome.evaluation.is_feasible());
        assert_abs_diff_eq!(outcome.x[0] + outcome.x[1], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(outcome.evaluation.objective, 0.5, epsilon = 1e-2);
    }

    #[test]
    fn test_infeasible_problem_reports_it() {
        // x >= 3 cannot hold inside [0, 1]
        let mut f = |x: &[f64]| Evaluation {
            objective: x[0],
            constraints: vec![x[0] - 3.0],
        };
        let outcome = CompassSearch::new().minimize(&mut f, &[0.5], &[(0.0, 1.0)]);

        assert!(!outcome.evaluation.is_feasible());
        assert_ne!(outcome.status, SolverStatus::Converged);
        assert_abs_diff_eq!(outcome.x[0], 1.0, epsilon = 1e-6);
    }
}
