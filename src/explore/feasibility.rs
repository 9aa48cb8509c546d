//! Per-record constraint classification of an experiment table.
//!
//! This is everything a design-space plot needs short of drawing it: which
//! records satisfy which constraint, the constraint limits and colors, and
//! the objective column to contour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::table::ExperimentTable;
use crate::error::{MdoError, Result};

/// Direction of a performance limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    /// Value must stay at or below the limit
    #[serde(rename = "ub")]
    Upper,
    /// Value must stay at or above the limit
    #[serde(rename = "lb")]
    Lower,
}

impl FromStr for Bound {
    type Err = MdoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ub" => Ok(Self::Upper),
            "lb" => Ok(Self::Lower),
            other => Err(MdoError::config(format!("bound must be 'ub' or 'lb', got '{}'", other))),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => write!(f, "ub"),
            Self::Lower => write!(f, "lb"),
        }
    }
}

/// A limit on one table field.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    /// Table label the limit applies to
    pub field: String,
    pub bound: Bound,
    /// In the field's display unit
    pub limit: f64,
    pub color: String,
}

impl ConstraintSpec {
    /// NaN never satisfies a constraint.
    pub fn is_satisfied(&self, value: f64) -> bool {
        match self.bound {
            Bound::Upper => value <= self.limit,
            Bound::Lower => value >= self.limit,
        }
    }
}

/// Satisfaction flags, one row per record and one column per constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Feasibility {
    pub constraints: Vec<String>,
    pub flags: Vec<Vec<bool>>,
}

impl Feasibility {
    /// Whether record `i` satisfies every constraint.
    pub fn is_feasible(&self, record: usize) -> bool {
        self.flags.get(record).is_some_and(|row| row.iter().all(|&ok| ok))
    }

    pub fn feasible_count(&self) -> usize {
        (0..self.flags.len()).filter(|&i| self.is_feasible(i)).count()
    }

    /// Labels of the constraints record `i` violates.
    pub fn violations(&self, record: usize) -> Vec<&str> {
        match self.flags.get(record) {
            Some(row) => row
                .iter()
                .zip(&self.constraints)
                .filter(|(ok, _)| !**ok)
                .map(|(_, name)| name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Classify every record of `table` against `specs`.
pub fn classify(table: &ExperimentTable, specs: &[ConstraintSpec]) -> Result<Feasibility> {
    let columns = specs
        .iter()
        .map(|s| table.require(&s.field))
        .collect::<Result<Vec<_>>>()?;

    let flags = table
        .records
        .iter()
        .map(|record| {
            specs
                .iter()
                .zip(&columns)
                .map(|(spec, &col)| spec.is_satisfied(record[col]))
                .collect()
        })
        .collect();

    Ok(Feasibility {
        constraints: specs.iter().map(|s| s.field.clone()).collect(),
        flags,
    })
}

/// Index of the feasible record with the smallest `field` value.
pub fn best_feasible(table: &ExperimentTable, feasibility: &Feasibility, field: &str) -> Result<Option<usize>> {
    let col = table.require(field)?;
    Ok(table
        .records
        .iter()
        .enumerate()
        .filter(|(i, r)| feasibility.is_feasible(*i) && !r[col].is_nan())
        .min_by(|(_, a), (_, b)| a[col].total_cmp(&b[col]))
        .map(|(i, _)| i))
}

/// One constraint as the renderer sees it.
#[derive(Debug, Clone)]
pub struct ConstraintView {
    pub field: String,
    pub bound: Bound,
    pub limit: f64,
    pub color: String,
    pub values: Vec<f64>,
    pub satisfied: Vec<bool>,
}

/// Data handed to an external design-space renderer.
#[derive(Debug, Clone)]
pub struct DesignSpaceView {
    /// Axis labels and values (design variable columns)
    pub axes: Vec<(String, Vec<f64>)>,
    /// Objective label and values
    pub objective: (String, Vec<f64>),
    /// Additional fields to display
    pub others: Vec<(String, Vec<f64>)>,
    pub constraints: Vec<ConstraintView>,
    /// Per-record "satisfies every constraint"
    pub feasible: Vec<bool>,
    /// Best feasible record by objective, if any
    pub best: Option<usize>,
}

impl DesignSpaceView {
    pub fn build(
        table: &ExperimentTable,
        axes: &[String],
        objective: &str,
        others: &[String],
        specs: &[ConstraintSpec],
    ) -> Result<Self> {
        let column = |label: &str| -> Result<(String, Vec<f64>)> {
            let i = table.require(label)?;
            Ok((label.to_string(), table.records.iter().map(|r| r[i]).collect()))
        };

        let feasibility = classify(table, specs)?;
        let constraints = specs
            .iter()
            .enumerate()
            .map(|(j, spec)| {
                let (_, values) = column(&spec.field)?;
                Ok(ConstraintView {
                    field: spec.field.clone(),
                    bound: spec.bound,
                    limit: spec.limit,
                    color: spec.color.clone(),
                    values,
                    satisfied: feasibility.flags.iter().map(|row| row[j]).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            axes: axes.iter().map(|a| column(a)).collect::<Result<_>>()?,
            objective: column(objective)?,
            others: others.iter().map(|o| column(o)).collect::<Result<_>>()?,
            constraints,
            feasible: (0..table.len()).map(|i| feasibility.is_feasible(i)).collect(),
            best: best_feasible(table, &feasibility, objective)?,
        })
    }
}
