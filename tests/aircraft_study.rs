//! End-to-end runs of the demo hydrogen study.

use approx::assert_relative_eq;

use lh2pac_core::{
    address,
    aircraft::Aircraft,
    config::Study,
    explore::{DesignSpaceView, ExperimentTable, Explorer},
    expr,
    mda::{Coupled, MdaSolver},
    optimize::MdfProblem,
};

const DEMO: &str = include_str!("../demos/h2_medium_range.toml");

fn baseline() -> (Study, Aircraft) {
    let study = Study::parse(DEMO, "h2_medium_range.toml").unwrap();
    let mut ac = study.build_aircraft().unwrap();
    let report = study.solver.mda_solver().solve(&mut ac, &Aircraft::schedule(study.mode));
    assert!(report.converged, "baseline MDA: {:?}", report.warning);
    (study, ac)
}

#[test]
fn test_baseline_is_consistent() {
    let (_, ac) = baseline();

    let w = &ac.weight_cg;
    let fuel = ac.performance.mission.nominal.fuel_total;
    assert_relative_eq!(w.mtow, w.owe + ac.performance.mission.nominal.payload + fuel, max_relative = 1e-5);
    assert_relative_eq!(w.mfw, fuel, max_relative = 1e-5);

    let thrust = expr::eval(&ac, "aircraft.power_system.reference_thrust/10.").unwrap();
    assert_relative_eq!(thrust, 12_100.0);
    let tofl_margin = expr::eval(
        &ac,
        "aircraft.performance.take_off.tofl_req - aircraft.performance.take_off.tofl_eff",
    )
    .unwrap();
    assert!(tofl_margin > 0.0);
}

#[test]
fn test_optimization_improves_on_baseline() {
    let (study, mut ac) = baseline();
    let start_mtow = ac.weight_cg.mtow;

    let opt = study.optimization().unwrap();
    let (constraints, magnitudes) = opt.unique_constraints();
    let bounds = opt.bounds();
    let problem = MdfProblem::new(&opt.variables, &bounds, &constraints, &magnitudes, &opt.criterion)
        .unwrap()
        .with_mode(study.mode)
        .with_mda_solver(study.solver.mda_solver());
    let solver = opt.method.build(opt.max_evaluations);
    let result = problem.solve(&mut ac, solver.as_ref()).unwrap();

    assert!(result.feasible, "status {}", result.status);
    assert!(result.evaluations <= opt.max_evaluations);
    assert!(result.objective <= start_mtow * (1.0 + 1e-5));
    for (x, (lo, hi)) in result.x.iter().zip(&bounds) {
        assert!(x >= lo && x <= hi);
    }

    // The reported optimum is reproducible from its design vector
    address::set_many(&mut ac, &result.variables, &result.x).unwrap();
    study.solver.mda_solver().solve(&mut ac, &Aircraft::schedule(study.mode));
    assert_relative_eq!(ac.weight_cg.mtow, result.objective, max_relative = 1e-4);
}

#[test]
fn test_explore_then_classify() {
    let (study, mut ac) = baseline();
    let start_mtow = ac.weight_cg.mtow;
    let exp = study.exploration().unwrap();
    let fields = exp.fields().unwrap();
    let path = std::env::temp_dir().join(format!("lh2pac_explore_{}.txt", std::process::id()));

    let table = Explorer::new()
        .with_policy(exp.policy())
        .with_mda_solver(MdaSolver::default())
        .run(&mut ac, &exp.variables, &exp.steps, &fields, &path, study.mode)
        .unwrap();
    assert_eq!(table.len(), 9);

    // Baseline put back after the sweep
    assert_relative_eq!(ac.power_system.reference_thrust, 121_000.0);
    assert_relative_eq!(ac.airframe.wing.area, 164.0);
    assert_relative_eq!(ac.weight_cg.mtow, start_mtow, max_relative = 1e-5);

    let thrust = table.column("Thrust").unwrap();
    assert_relative_eq!(thrust.iter().cloned().fold(f64::INFINITY, f64::min), 10_890.0, max_relative = 1e-9);
    assert_relative_eq!(thrust.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 13_310.0, max_relative = 1e-9);

    let read = ExperimentTable::read(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(read.labels, table.labels);
    assert_eq!(read.units, table.units);
    assert_eq!(read.len(), 9);

    let feas = study.feasibility().unwrap();
    let specs = feas.specs(&ac).unwrap();
    let axes = study.feasibility_axes().unwrap();
    let view = DesignSpaceView::build(&read, &axes, &feas.field, &feas.other, &specs).unwrap();

    assert_eq!(view.axes[0].0, "Thrust");
    assert_eq!(view.axes[1].0, "Wing_area");
    assert_eq!(view.constraints.len(), 8);
    assert_eq!(view.feasible.len(), 9);

    let tofl = &view.constraints[0];
    assert_eq!(tofl.field, "TOFL");
    for (value, ok) in tofl.values.iter().zip(&tofl.satisfied) {
        assert_eq!(*ok, *value <= tofl.limit);
    }
    if let Some(best) = view.best {
        assert!(view.feasible[best]);
    }
}
