//! LH2PAC - hydrogen airliner design studies
//!
//! Runs the drivers of a TOML study file against the aircraft it describes.
//!
//! # Usage
//!
//! ```bash
//! lh2pac mda --config demos/h2_medium_range.toml
//! lh2pac optimize --config demos/h2_medium_range.toml -v
//! lh2pac explore --config demos/h2_medium_range.toml --output grid.txt
//! lh2pac feasibility --config demos/h2_medium_range.toml --table grid.txt
//! lh2pac get --config demos/h2_medium_range.toml aircraft.weight_cg.mtow
//! ```
//!
//! Tables and results go to stdout, logs to stderr.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use lh2pac_core::{
    address,
    aircraft::Aircraft,
    config::Study,
    error::Result,
    explore::{DesignSpaceView, ExperimentTable, Explorer},
    expr,
    mda::{Coupled, MdaSolver},
    optimize::MdfProblem,
    telemetry, units,
};

/// Hydrogen airliner MDA/MDO engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the study file (.toml)
    #[arg(short, long, value_name = "STUDY_FILE", global = true, default_value = "study.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Converge the baseline aircraft and print its main characteristics
    Mda,
    /// Run the study's MDF optimization
    Optimize,
    /// Sweep the study's design grid and write the experiment table
    Explore {
        /// Override the table path of the study
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify a persisted experiment table against the study's limits
    Feasibility {
        /// Table to read, defaults to the exploration output
        #[arg(short, long)]
        table: Option<PathBuf>,
    },
    /// Evaluate paths or expressions on the converged baseline
    Get {
        #[arg(required = true)]
        expressions: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose);

    let study = Study::load(&args.config)?;
    let mda = study.solver.mda_solver();
    let mut aircraft = study.build_aircraft()?;
    info!(study = %study.name, mode = %study.mode, "study loaded");

    match &args.command {
        Command::Mda => {
            converge(&mut aircraft, &study, &mda);
            print_summary(&aircraft);
        }
        Command::Optimize => run_optimize(&mut aircraft, &study, &mda)?,
        Command::Explore { output } => {
            converge(&mut aircraft, &study, &mda);
            let exp = study.exploration()?;
            let output = output.as_deref().unwrap_or(exp.output.as_path());
            let table = Explorer::new().with_policy(exp.policy()).with_mda_solver(mda).run(
                &mut aircraft,
                &exp.variables,
                &exp.steps,
                &exp.fields()?,
                output,
                study.mode,
            )?;
            println!("{} records written to {}", table.len(), output.display());
        }
        Command::Feasibility { table } => {
            converge(&mut aircraft, &study, &mda);
            let path = match table {
                Some(path) => path.clone(),
                None => study.exploration()?.output.clone(),
            };
            run_feasibility(&aircraft, &study, &path)?;
        }
        Command::Get { expressions } => {
            converge(&mut aircraft, &study, &mda);
            for text in expressions {
                println!("{} = {}", text, expr::eval(&aircraft, text)?);
            }
        }
    }

    Ok(())
}

fn converge(aircraft: &mut Aircraft, study: &Study, mda: &MdaSolver) {
    let report = mda.solve(aircraft, &Aircraft::schedule(study.mode));
    if let Some(warning) = &report.warning {
        warn!("{}", warning);
    }
}

fn print_summary(ac: &Aircraft) {
    let w = &ac.weight_cg;
    let perf = &ac.performance;
    let rows = [
        ("Wing area (m2)", ac.airframe.wing.area),
        ("Wing span (m)", ac.airframe.wing.span),
        ("Fuselage length (m)", ac.airframe.body.length),
        ("Fuselage aspect ratio", ac.airframe.body.aspect_ratio),
        ("Tank length (m)", ac.airframe.tank.length),
        ("Reference thrust (kN)", units::kN_N(ac.power_system.reference_thrust)),
        ("MTOW (kg)", w.mtow),
        ("MLW (kg)", w.mlw),
        ("OWE (kg)", w.owe),
        ("MWE (kg)", w.mwe),
        ("MFW (kg)", w.mfw),
        ("Mission fuel (kg)", perf.mission.nominal.fuel_total),
        ("Cruise L/D", perf.mission.crz_lod),
        ("Cruise SFC (kg/daN/h)", perf.mission.crz_tsfc * 36_000.0),
        ("TOFL (m)", perf.take_off.tofl_eff),
        ("Approach speed (kt)", units::kt_mps(perf.approach.app_speed_eff)),
        ("MCL vz (ft/min)", units::ftpmin_mps(perf.mcl_ceiling.vz_eff)),
        ("MCR vz (ft/min)", units::ftpmin_mps(perf.mcr_ceiling.vz_eff)),
        ("OEI path (%)", units::pc_no_dim(perf.oei_ceiling.path_eff)),
        ("Time to climb (min)", units::min_s(perf.time_to_climb.ttc_eff)),
        ("Direct op cost ($/trip)", ac.economics.direct_op_cost),
        ("CO2 metric (kg/km/m0.48)", units::kgpkm_kgpm(ac.environment.CO2_metric)),
    ];
    println!("{}", ac.name);
    for (label, value) in rows {
        println!("  {:<26} {:>12.3}", label, value);
    }
}

fn run_optimize(aircraft: &mut Aircraft, study: &Study, mda: &MdaSolver) -> Result<()> {
    let opt = study.optimization()?;
    let (constraints, magnitudes) = opt.unique_constraints();
    let problem = MdfProblem::new(&opt.variables, &opt.bounds(), &constraints, &magnitudes, &opt.criterion)?
        .with_mode(study.mode)
        .with_mda_solver(mda.clone());
    let solver = opt.method.build(opt.max_evaluations);
    let result = problem.solve(aircraft, solver.as_ref())?;

    // Leave the aircraft at the optimum rather than the last candidate
    address::set_many(aircraft, &result.variables, &result.x)?;
    converge(aircraft, study, mda);

    println!("status: {} ({} evaluations)", result.status, result.evaluations);
    println!("feasible: {}", result.feasible);
    println!("{} = {:.3}", opt.criterion, result.objective);
    for (path, x) in result.variables.iter().zip(&result.x) {
        println!("  {} = {:.3}", path, x);
    }
    for (text, c) in constraints.iter().zip(&result.constraints) {
        println!("  {:>9.4}  {}", c, text);
    }
    print_summary(aircraft);
    Ok(())
}

fn run_feasibility(aircraft: &Aircraft, study: &Study, path: &Path) -> Result<()> {
    let feas = study.feasibility()?;
    let specs = feas.specs(aircraft)?;
    let table = ExperimentTable::read(path)?;
    let view = DesignSpaceView::build(&table, &study.feasibility_axes()?, &feas.field, &feas.other, &specs)?;

    let feasible = view.feasible.iter().filter(|&&f| f).count();
    println!("{}: {} of {} records feasible", path.display(), feasible, table.len());
    for c in &view.constraints {
        let ok = c.satisfied.iter().filter(|&&s| s).count();
        println!("  {:<12} {} {:>10.3}  {:>4} ok  ({})", c.field, c.bound, c.limit, ok, c.color);
    }
    match view.best {
        Some(i) => {
            println!("best feasible {} = {:.3}", view.objective.0, view.objective.1[i]);
            for (label, values) in view.axes.iter().chain(&view.others) {
                println!("  {} = {:.3}", label, values[i]);
            }
        }
        None => println!("no feasible record"),
    }
    Ok(())
}
