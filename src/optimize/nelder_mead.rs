//! Bounded Nelder-Mead simplex search under a sequential penalty.

use tracing::debug;

use super::solver::{project, span, ConstrainedSolver, Evaluation, PenaltySettings, SolverOutcome, Tracker};
use super::DEFAULT_MAX_EVALUATIONS;

// Standard reflection/expansion/contraction/shrink coefficients
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Derivative-free simplex method.
///
/// Every vertex is projected onto the bounds before it is evaluated, so the
/// callback never sees an out-of-bounds point.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Shared evaluation budget over all penalty stages
    pub max_evaluations: usize,
    /// Initial edge length as a fraction of each bound interval
    pub initial_step: f64,
    /// Stop when the merit spread over the simplex is below this
    pub ftol: f64,
    /// ...and the simplex fits in a box of this size (fraction of bounds)
    pub xtol: f64,
    pub penalty: PenaltySettings,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self::new()
    }
}

impl NelderMead {
    pub fn new() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            initial_step: 0.1,
            ftol: 1e-8,
            xtol: 1e-6,
            penalty: PenaltySettings::default(),
        }
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations.max(1);
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    pub fn with_tolerances(mut self, ftol: f64, xtol: f64) -> Self {
        self.ftol = ftol;
        self.xtol = xtol;
        self
    }

    pub fn with_penalty(mut self, penalty: PenaltySettings) -> Self {
        self.penalty = penalty;
        self
    }

    /// One unconstrained simplex run at a fixed penalty weight.
    fn search(&self, tracker: &mut Tracker<'_>, x0: &[f64], weight: f64) -> (Vec<f64>, bool) {
        let n = x0.len();
        let widths: Vec<f64> = tracker.bounds().iter().map(|&(lo, hi)| span(lo, hi)).collect();

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push(tracker.merit(x0, weight));
        for i in 0..n {
            if tracker.exhausted() {
                break;
            }
            let (_, hi) = tracker.bounds()[i];
            let h = self.initial_step * widths[i];
            let mut v = x0.to_vec();
            v[i] = if x0[i] + h <= hi { x0[i] + h } else { x0[i] - h };
            simplex.push(tracker.merit(&v, weight));
        }
        if simplex.len() < n + 1 {
            return (simplex.swap_remove(0).0, false);
        }

        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let spread = simplex[n].1 - simplex[0].1;
            let diameter = simplex[1..]
                .iter()
                .flat_map(|(v, _)| {
                    v.iter()
                        .zip(&simplex[0].0)
                        .zip(&widths)
                        .map(|((a, b), w)| (a - b).abs() / w)
                })
                .fold(0.0, f64::max);
            if spread.abs() <= self.ftol && diameter <= self.xtol {
                return (simplex.swap_remove(0).0, true);
            }
            if tracker.exhausted() {
                return (simplex.swap_remove(0).0, false);
            }

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].clone();
            let along = |t: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + t * (x - c))
                    .collect()
            };

            let reflected = tracker.merit(&along(-ALPHA, &worst.0), weight);
            if tracker.exhausted() {
                if reflected.1 < simplex[0].1 {
                    return (reflected.0, false);
                }
                return (simplex.swap_remove(0).0, false);
            }
            if reflected.1 < simplex[0].1 {
                let expanded = tracker.merit(&along(-ALPHA * GAMMA, &worst.0), weight);
                simplex[n] = if expanded.1 < reflected.1 { expanded } else { reflected };
                continue;
            }
            if reflected.1 < simplex[n - 1].1 {
                simplex[n] = reflected;
                continue;
            }

            let contracted = if reflected.1 < worst.1 {
                tracker.merit(&along(RHO, &reflected.0), weight)
            } else {
                tracker.merit(&along(RHO, &worst.0), weight)
            };
            if contracted.1 < reflected.1.min(worst.1) {
                simplex[n] = contracted;
                continue;
            }

            // Shrink towards the best vertex
            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                if tracker.exhausted() {
                    break;
                }
                let v: Vec<f64> = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, x)| b + SIGMA * (x - b))
                    .collect();
                *vertex = tracker.merit(&v, weight);
            }
        }
    }
}

impl ConstrainedSolver for NelderMead {
    fn name(&self) -> &'static str {
        "nelder_mead"
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
            debug!(stage, weight, converged = ok, "simplex stage finished");
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
