//! Design-space exploration.
//!
//! Sweeps a grid of design variable values around the current design, runs an
//! MDA at every point, evaluates a list of named expressions and persists the
//! resulting [`ExperimentTable`]. The table can later be classified against
//! performance limits with [`classify`] to draw a feasibility map.

mod feasibility;
mod format;
mod grid;
mod table;

pub use feasibility::{
    best_feasible, classify, Bound, ConstraintSpec, ConstraintView, DesignSpaceView, Feasibility,
};
pub use format::{Conversion, FieldFormat};
pub use grid::GridPolicy;
pub use table::{ExperimentTable, FieldSpec, TableWriter};

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::address::Addressable;
use crate::error::{MdoError, Result};
use crate::expr::Expression;
use crate::mda::{Coupled, MdaMode, MdaSolver};

/// Grid sweep driver.
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    policy: GridPolicy,
    mda: MdaSolver,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: GridPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mda_solver(mut self, mda: MdaSolver) -> Self {
        self.mda = mda;
        self
    }

    /// Sweep the grid and write the table to `output`.
    ///
    /// All paths and expressions are checked before the first MDA. The state
    /// is put back at its baseline design (and re-converged) before returning.
    pub fn run<S: Addressable + Coupled>(
        &self,
        state: &mut S,
        variables: &[String],
        relative_steps: &[f64],
        data: &[FieldSpec],
        output: &Path,
        mode: MdaMode,
    ) -> Result<ExperimentTable> {
        if variables.is_empty() {
            return Err(MdoError::config("no design variables to explore"));
        }
        if data.is_empty() {
            return Err(MdoError::config("no data fields to record"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = data.iter().find(|f| !seen.insert(f.label.as_str())) {
            return Err(MdoError::config(format!("duplicate data label '{}'", dup.label)));
        }

        let registry = S::registry();
        let fields = variables
            .iter()
            .map(|p| registry.resolve(p))
            .collect::<Result<Vec<_>>>()?;
        let expressions = data
            .iter()
            .map(|f| Expression::<S>::compile(&f.expression))
            .collect::<Result<Vec<_>>>()?;

        let baseline: Vec<f64> = fields.iter().map(|f| (f.get)(state)).collect();
        let points = self.policy.points(&baseline, relative_steps)?;
        let schedule = S::schedule(mode);
        info!(points = points.len(), %mode, "exploring design space");

        let mut table = ExperimentTable::new(data);
        let mut unconverged = 0usize;
        for (i, point) in points.iter().enumerate() {
            for (field, &v) in fields.iter().zip(point) {
                (field.set)(state, v);
            }
            let report = self.mda.solve(state, &schedule);
            if !report.converged {
                unconverged += 1;
            }
            let record: Vec<f64> = expressions.iter().map(|e| e.eval(state)).collect();
            debug!(point = i, values = ?point, converged = report.converged, "grid point done");
            table.push(record);
        }

        for (field, &v) in fields.iter().zip(&baseline) {
            (field.set)(state, v);
        }
        self.mda.solve(state, &schedule);

        if unconverged > 0 {
            warn!(unconverged, "some grid points did not converge");
        }
        table.write(output)?;
        info!(records = table.len(), output = %output.display(), "experiment table written");
        Ok(table)
    }
}

/// [`Explorer::run`] with the default grid and MDA settings.
pub fn explore<S: Addressable + Coupled>(
    state: &mut S,
    variables: &[String],
    relative_steps: &[f64],
    data: &[FieldSpec],
    output: &Path,
    mode: MdaMode,
) -> Result<ExperimentTable> {
    Explorer::new().run(state, variables, relative_steps, data, output, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Registry;
    use crate::mda::{Discipline, Schedule};
    use approx::assert_relative_eq;
    use once_cell::sync::Lazy;

    /// span = sqrt(ar * area), mass = 10 * area + 2 * span
    #[derive(Debug, Default, Clone)]
    struct Wing {
        area: f64,
        ar: f64,
        span: f64,
        mass: f64,
    }

    static WING_FIELDS: Lazy<Registry<Wing>> = Lazy::new(|| {
        let mut reg: Registry<Wing> = Registry::new("wing");
        crate::fields!(reg, Wing, "wing"; area, ar, span, mass);
        reg
    });

    impl Addressable for Wing {
        fn registry() -> &'static Registry<Self> {
            &WING_FIELDS
        }
    }

    struct Sizing;

    impl Discipline<Wing> for Sizing {
        fn name(&self) -> &'static str {
            "sizing"
        }
        fn update(&self, w: &mut Wing) {
            w.span = (w.ar * w.area).sqrt();
            w.mass = 10.0 * w.area + 2.0 * w.span;
        }
    }

    impl Coupled for Wing {
        fn schedule(_mode: MdaMode) -> Schedule<Self> {
            Schedule::new().step(Sizing)
        }
    }

    fn data() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("Area", "m2", "%8.1f", "wing.area").unwrap(),
            FieldSpec::new("AR", "no_dim", "%6.2f", "wing.ar").unwrap(),
            FieldSpec::new("Mass", "t", "%8.3f", "wing.mass / 1000").unwrap(),
        ]
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lh2pac_{}_{}.txt", name, std::process::id()))
    }

    #[test]
    fn test_sweep_restores_baseline() {
        let mut wing = Wing {
            area: 100.0,
            ar: 9.0,
            ..Default::default()
        };
        let path = temp_path("explore_sweep");
        let vars = vec!["wing.area".to_string(), "wing.ar".to_string()];
        let table = explore(&mut wing, &vars, &[0.2, 0.1], &data(), &path, MdaMode::Mda).unwrap();

        assert_eq!(table.len(), 9);
        let areas = table.column("Area").unwrap();
        assert_relative_eq!(areas[0], 80.0);
        assert_relative_eq!(areas[4], 100.0);
        assert_relative_eq!(areas[8], 120.0);
        let baseline_rows = table
            .records
            .iter()
            .filter(|r| r[0] == 100.0 && r[1] == 9.0)
            .count();
        assert_eq!(baseline_rows, 1);

        // State is back at the converged baseline
        assert_eq!(wing.area, 100.0);
        assert_eq!(wing.ar, 9.0);
        assert_relative_eq!(wing.span, 30.0);

        let back = ExperimentTable::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.labels, vec!["Area", "AR", "Mass"]);
        assert_eq!(back.len(), 9);
        assert_relative_eq!(back.records[4][2], 1.06, epsilon = 1e-9);
    }

    #[test]
    fn test_denser_policy() {
        let mut wing = Wing {
            area: 50.0,
            ar: 8.0,
            ..Default::default()
        };
        let path = temp_path("explore_dense");
        let table = Explorer::new()
            .with_policy(GridPolicy::new(2))
            .run(&mut wing, &["wing.area".to_string()], &[0.1], &data(), &path, MdaMode::Mda)
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.column("Area").unwrap(), vec![40.0, 45.0, 50.0, 55.0, 60.0]);
    }

    #[test]
    fn test_bad_inputs_fail_before_any_mda() {
        let mut wing = Wing {
            area: 100.0,
            ar: 9.0,
            ..Default::default()
        };
        let path = temp_path("explore_never_written");
        let vars = vec!["wing.area".to_string()];

        let err = explore(&mut wing, &vars, &[0.1, 0.1], &data(), &path, MdaMode::Mda).unwrap_err();
        assert!(matches!(err, MdoError::Config { .. }));

        let err = explore(&mut wing, &["wing.chord".to_string()], &[0.1], &data(), &path, MdaMode::Mda)
            .unwrap_err();
        assert!(matches!(err, MdoError::Address { .. }));

        let mut bad = data();
        bad[2].expression = "exec(1)".into();
        let err = explore(&mut wing, &vars, &[0.1], &bad, &path, MdaMode::Mda).unwrap_err();
        assert!(matches!(err, MdoError::Evaluation { .. }));

        let mut dup = data();
        dup[1].label = "Area".into();
        assert!(explore(&mut wing, &vars, &[0.1], &dup, &path, MdaMode::Mda).is_err());

        assert_eq!(wing.span, 0.0);
        assert!(!path.exists());
    }
}
