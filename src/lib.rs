//! # LH2PAC Core
//!
//! Multidisciplinary design analysis and optimization of a hydrogen-powered
//! turbofan airliner.
//!
//! This library provides:
//! - A fixed-point MDA engine over a graph of coupled disciplines
//! - Late-bound access to every design scalar by dotted path, plus a small
//!   sandboxed expression language over those paths
//! - MDF constrained optimization of design variables
//! - Design-space exploration with persisted tables and feasibility maps
//!
//! ## Architecture
//!
//! - [`address`] - Parameter registry and accessor
//! - [`expr`] - Expression lexer, parser and evaluator
//! - [`mda`] - Disciplines, coupling schedules and the MDA solver
//! - [`optimize`] - MDF problem and numerical solvers
//! - [`explore`] - Grid sweeps, experiment tables and feasibility
//! - [`aircraft`] - The reduced-order aircraft model
//! - [`config`] - TOML study files
//!
//! ## Usage
//!
//! ```bash
//! lh2pac optimize --config demos/h2_medium_range.toml
//! ```
//!
//! ```no_run
//! use lh2pac_core::{aircraft::Aircraft, config::Study, mda::run_mda};
//!
//! let study = Study::load("demos/h2_medium_range.toml".as_ref())?;
//! let mut ac: Aircraft = study.build_aircraft()?;
//! let report = run_mda(&mut ac, study.mode);
//! println!("MTOW {:.0} kg after {} passes", ac.weight_cg.mtow, report.passes);
//! # Ok::<(), lh2pac_core::MdoError>(())
//! ```
//!
//! ## Analysis Method
//!
//! Every driver follows the same loop:
//!
//! 1. Write design variables through the accessor
//! 2. Converge the MDA (Gauss-Seidel passes over the disciplines)
//! 3. Read outputs back through compiled expressions
//!
//! Non-convergence of an MDA is reported, never raised.

pub mod address;
pub mod aircraft;
pub mod config;
pub mod error;
pub mod explore;
pub mod expr;
pub mod mda;
pub mod optimize;
pub mod units;

#[cfg(feature = "cli")]
pub mod telemetry;

// Re-export main types for convenience
pub use aircraft::Aircraft;
pub use config::Study;
pub use error::{MdoError, Result};
pub use mda::{run_mda, MdaMode, MdaReport};
