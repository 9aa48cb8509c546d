//! Fixed-point MDA solver.

use std::fmt;

use tracing::{debug, warn};

use super::discipline::{Discipline, Schedule, Stage};
use super::{DEFAULT_MAX_PASSES, DEFAULT_SUB_LOOP_PASSES, DEFAULT_TOLERANCE};

/// The pass cap was reached (or a residual went non-finite) before every
/// residual settled. Non-fatal: the state holds the last pass's values.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceWarning {
    /// Outer passes performed
    pub passes: usize,
    /// Largest absolute residual after the last pass
    pub max_residual: f64,
    /// Discipline holding that residual
    pub discipline: String,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MDA did not converge after {} passes (residual {:.2e} in '{}')",
            self.passes, self.max_residual, self.discipline
        )
    }
}

/// Outcome of one MDA solve.
#[derive(Debug, Clone)]
pub struct MdaReport {
    /// Outer passes performed
    pub passes: usize,
    /// Whether every residual ended below tolerance
    pub converged: bool,
    /// Residual of each discipline after the last pass
    pub residuals: Vec<(String, f64)>,
    /// Set when `converged` is false
    pub warning: Option<ConvergenceWarning>,
}

impl MdaReport {
    /// Largest absolute residual (NaN if any residual is NaN).
    pub fn max_residual(&self) -> f64 {
        max_abs(self.residuals.iter().map(|(_, r)| *r))
    }

    /// Residual of the named discipline.
    pub fn residual(&self, name: &str) -> Option<f64> {
        self.residuals.iter().find(|(n, _)| n == name).map(|(_, r)| *r)
    }
}

/// Configuration for the MDA solver.
#[derive(Debug, Clone)]
pub struct MdaSolver {
    /// Maximum outer passes per solve
    pub max_passes: usize,
    /// Residual tolerance (residuals are already normalised)
    pub tolerance: f64,
    /// Maximum iterations of each sub-loop per outer pass
    pub sub_loop_passes: usize,
}

impl Default for MdaSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MdaSolver {
    /// Create a solver with default settings.
    pub fn new() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            tolerance: DEFAULT_TOLERANCE,
            sub_loop_passes: DEFAULT_SUB_LOOP_PASSES,
        }
    }

    /// Set the maximum number of outer passes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Set the residual tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the sub-loop iteration cap.
    pub fn with_sub_loop_passes(mut self, passes: usize) -> Self {
        self.sub_loop_passes = passes.max(1);
        self
    }

    /// Converge `state` in place by repeated passes over `schedule`.
    ///
    /// Always returns. On success every residual is below tolerance at once;
    /// otherwise the report carries a [`ConvergenceWarning`].
    pub fn solve<S>(&self, state: &mut S, schedule: &Schedule<S>) -> MdaReport {
        let disciplines = schedule.disciplines();
        let mut residuals = Vec::new();

        for pass in 1..=self.max_passes {
            for stage in schedule.stages() {
                match stage {
                    Stage::Step(d) => d.update(state),
                    Stage::Loop { label, disciplines } => {
                        self.run_sub_loop(state, label, disciplines);
                    }
                }
            }

            residuals = evaluate(&disciplines, state);
            let (worst, max) = worst_residual(&residuals);
            debug!(pass, max_residual = max, worst = %worst, "MDA pass");

            if !max.is_finite() {
                warn!(pass, discipline = %worst, "non-finite residual, stopping MDA");
                return self.not_converged(pass, residuals);
            }
            if max < self.tolerance {
                debug!(passes = pass, max_residual = max, "MDA converged");
                return MdaReport {
                    passes: pass,
                    converged: true,
                    residuals,
                    warning: None,
                };
            }
        }

        self.not_converged(self.max_passes, residuals)
    }

    /// Iterate a sub-loop. Returns the iteration it settled at, if it did.
    fn run_sub_loop<S>(
        &self,
        state: &mut S,
        label: &str,
        disciplines: &[Box<dyn Discipline<S>>],
    ) -> Option<usize> {
        for iteration in 1..=self.sub_loop_passes {
            for d in disciplines {
                d.update(state);
            }
            let max = max_abs(disciplines.iter().map(|d| d.eval_residual(state)));
            if !max.is_finite() {
                debug!(label, iteration, "non-finite residual, leaving sub-loop");
                return None;
            }
            if max < self.tolerance {
                debug!(label, iteration, "sub-loop settled");
                return Some(iteration);
            }
        }
        debug!(label, passes = self.sub_loop_passes, "sub-loop hit its cap");
        None
    }

    fn not_converged(&self, passes: usize, residuals: Vec<(String, f64)>) -> MdaReport {
        let (worst, max) = worst_residual(&residuals);
        let warning = ConvergenceWarning {
            passes,
            max_residual: max,
            discipline: worst,
        };
        warn!("{}", warning);
        MdaReport {
            passes,
            converged: false,
            residuals,
            warning: Some(warning),
        }
    }
}

fn evaluate<S>(disciplines: &[&dyn Discipline<S>], state: &S) -> Vec<(String, f64)> {
    disciplines
        .iter()
        .map(|d| (d.name().to_string(), d.eval_residual(state)))
        .collect()
}

/// Largest magnitude; NaN if any value is NaN.
fn max_abs(values: impl Iterator<Item = f64>) -> f64 {
    values
        .map(f64::abs)
        .fold(0.0, |acc: f64, r| if r.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(r) })
}

/// Name and magnitude of the largest residual; NaN wins over everything.
fn worst_residual(residuals: &[(String, f64)]) -> (String, f64) {
    let mut worst = (String::from("-"), 0.0f64);
    for (name, r) in residuals {
        let mag = r.abs();
        if mag.is_nan() {
            return (name.clone(), f64::NAN);
        }
        if mag > worst.1 {
            worst = (name.clone(), mag);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Halves `x` towards 0 each update; the residual is `x` itself.
    struct Decay;

    impl Discipline<f64> for Decay {
        fn name(&self) -> &'static str {
            "decay"
        }

        fn update(&self, x: &mut f64) {
            *x *= 0.5;
        }

        fn eval_residual(&self, x: &f64) -> f64 {
            *x
        }
    }

    struct Broken;

    impl Discipline<f64> for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn update(&self, _x: &mut f64) {}

        fn eval_residual(&self, _x: &f64) -> f64 {
            f64::NAN
        }
    }

    #[test]
    fn test_max_abs_keeps_nan() {
        assert_eq!(max_abs([1.0, -3.0, 2.0].into_iter()), 3.0);
        assert!(max_abs([1.0, f64::NAN, 2.0].into_iter()).is_nan());
        assert!(max_abs([f64::NAN, 5.0].into_iter()).is_nan());
        assert_eq!(max_abs(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_sub_loop_settles() {
        let solver = MdaSolver::new().with_tolerance(0.1).with_sub_loop_passes(20);
        let sub_loop: Vec<Box<dyn Discipline<f64>>> = vec![Box::new(Decay)];
        let mut x = 1.0;
        // 0.5, 0.25, 0.125, 0.0625
        assert_eq!(solver.run_sub_loop(&mut x, "decay", &sub_loop), Some(4));
    }

    #[test]
    fn test_nan_residual_does_not_settle_sub_loop() {
        let solver = MdaSolver::new().with_sub_loop_passes(5);
        let sub_loop: Vec<Box<dyn Discipline<f64>>> = vec![Box::new(Decay), Box::new(Broken)];
        let mut x = 1.0;
        assert_eq!(solver.run_sub_loop(&mut x, "broken", &sub_loop), None);
        assert_eq!(x, 0.5);

        let report = MdaReport {
            passes: 1,
            converged: false,
            residuals: vec![("decay".into(), 0.5), ("broken".into(), f64::NAN)],
            warning: None,
        };
        assert!(report.max_residual().is_nan());
    }
}
