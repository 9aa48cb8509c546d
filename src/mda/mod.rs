//! Multidisciplinary design analysis (MDA).
//!
//! The MDA engine converges a graph of coupled disciplines to a consistent
//! design point for fixed design variables. It is a plain fixed-point
//! (Gauss-Seidel) iteration:
//!
//! 1. Call every discipline's `update()` in the schedule's fixed order
//!    (sub-loops are iterated on their own until they settle).
//! 2. Evaluate every discipline's residual.
//! 3. Stop when all residuals are below tolerance at once, or when the pass
//!    cap is reached.
//!
//! Hitting the cap is not an error. The state keeps the last pass's values and
//! the [`MdaReport`] carries a [`ConvergenceWarning`]; callers that care about
//! correctness inspect the report.
//!
//! At most one solve may run against a given state at a time. The `&mut`
//! borrow taken by [`MdaSolver::solve`] enforces that; no locking is done.

mod discipline;
mod solver;

pub use discipline::{Coupled, Discipline, MdaMode, Schedule, Stage};
pub use solver::{ConvergenceWarning, MdaReport, MdaSolver};

/// Default maximum outer passes per MDA.
pub const DEFAULT_MAX_PASSES: usize = 50;

/// Default relative residual tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default iteration cap of each sub-loop.
pub const DEFAULT_SUB_LOOP_PASSES: usize = 20;

/// Run an MDA with default solver settings.
pub fn run_mda<S: Coupled>(state: &mut S, mode: MdaMode) -> MdaReport {
    MdaSolver::default().solve(state, &S::schedule(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// x = 0.5 y + 1 and y = 0.5 x + 2, fixed point (8/3, 10/3).
    #[derive(Debug, Default, Clone)]
    struct Toy {
        x: f64,
        y: f64,
    }

    struct A;
    struct B;

    impl Discipline<Toy> for A {
        fn name(&self) -> &'static str {
            "a"
        }
        fn update(&self, s: &mut Toy) {
            s.x = 0.5 * s.y + 1.0;
        }
        fn eval_residual(&self, s: &Toy) -> f64 {
            s.x - (0.5 * s.y + 1.0)
        }
    }

    impl Discipline<Toy> for B {
        fn name(&self) -> &'static str {
            "b"
        }
        fn update(&self, s: &mut Toy) {
            s.y = 0.5 * s.x + 2.0;
        }
        fn eval_residual(&self, s: &Toy) -> f64 {
            s.y - (0.5 * s.x + 2.0)
        }
    }

    impl Coupled for Toy {
        fn schedule(mode: MdaMode) -> Schedule<Self> {
            match mode {
                MdaMode::Mda => Schedule::new().step(A).step(B),
                MdaMode::MdaPlus => Schedule::new()
                    .sub_loop("ab", vec![Box::new(A) as Box<dyn Discipline<Toy>>, Box::new(B)])
                    .step(A)
                    .step(B),
            }
        }
    }

    /// x = 2 x + 1 never settles.
    struct Runaway;

    impl Discipline<Toy> for Runaway {
        fn name(&self) -> &'static str {
            "runaway"
        }
        fn update(&self, s: &mut Toy) {
            s.x = 2.0 * s.x + 1.0;
        }
        fn eval_residual(&self, s: &Toy) -> f64 {
            s.x - (2.0 * s.x + 1.0)
        }
    }

    /// Produces NaN on the first pass.
    struct Broken;

    impl Discipline<Toy> for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn update(&self, s: &mut Toy) {
            s.x = f64::NAN;
        }
        fn eval_residual(&self, s: &Toy) -> f64 {
            s.x
        }
    }

    #[test]
    fn test_converges_to_closed_form_fixed_point() {
        let mut toy = Toy { x: -50.0, y: 400.0 };
        let report = run_mda(&mut toy, MdaMode::Mda);

        assert!(report.converged);
        assert!(report.passes <= 20, "took {} passes", report.passes);
        assert!(report.max_residual() < 1e-6);
        assert!(report.warning.is_none());
        assert_abs_diff_eq!(toy.x, 8.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(toy.y, 10.0 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_idempotent_on_converged_state() {
        let mut toy = Toy::default();
        assert!(run_mda(&mut toy, MdaMode::Mda).converged);
        let before = toy.clone();

        let report = run_mda(&mut toy, MdaMode::Mda);
        assert!(report.converged);
        assert_eq!(report.passes, 1);
        assert_abs_diff_eq!(toy.x, before.x, epsilon = DEFAULT_TOLERANCE);
        assert_abs_diff_eq!(toy.y, before.y, epsilon = DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_sub_loop_mode_reaches_same_point() {
        let mut plain = Toy::default();
        let mut plus = Toy::default();
        run_mda(&mut plain, MdaMode::Mda);
        let report = run_mda(&mut plus, MdaMode::MdaPlus);

        assert!(report.converged);
        assert!(report.passes <= 2);
        assert_abs_diff_eq!(plain.x, plus.x, epsilon = 1e-5);
        assert_eq!(Toy::schedule(MdaMode::MdaPlus).describe(), "ab[a, b] -> a -> b");
        assert_eq!(Toy::schedule(MdaMode::MdaPlus).disciplines().len(), 2);
    }

    #[test]
    fn test_pass_cap_returns_with_warning() {
        let mut toy = Toy::default();
        let schedule = Schedule::new().step(Runaway);
        let report = MdaSolver::new().with_max_passes(10).solve(&mut toy, &schedule);

        assert!(!report.converged);
        assert_eq!(report.passes, 10);
        let warning = report.warning.clone().expect("warning expected");
        assert_eq!(warning.discipline, "runaway");
        assert!(warning.max_residual > 1.0);
        assert!(report.residual("runaway").unwrap().abs() > 1.0);
    }

    #[test]
    fn test_nan_stops_early() {
        let mut toy = Toy::default();
        let schedule = Schedule::new().step(Broken);
        let report = MdaSolver::new().solve(&mut toy, &schedule);

        assert!(!report.converged);
        assert_eq!(report.passes, 1);
        assert!(report.max_residual().is_nan());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("mda".parse::<MdaMode>().unwrap(), MdaMode::Mda);
        assert_eq!("mda_plus".parse::<MdaMode>().unwrap(), MdaMode::MdaPlus);
        assert_eq!("MDA-PLUS".parse::<MdaMode>().unwrap(), MdaMode::MdaPlus);
        assert!("newton".parse::<MdaMode>().is_err());
        assert_eq!(MdaMode::MdaPlus.to_string(), "mda_plus");
    }
}
