//! Experiment table and its text persistence.
//!
//! File layout, whitespace separated, one line each:
//!
//! ```text
//! Thrust     Wing_area  MTOW      <- labels
//! daN        m2         kg        <- units
//! %8.1f      %8.1f      %8.1f     <- display formats
//! 10890.0    147.6      76012.3   <- one line per record
//! ...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::format::FieldFormat;
use crate::error::{MdoError, Result};

/// One column of an exploration: what to evaluate and how to show it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub label: String,
    pub unit: String,
    pub format: FieldFormat,
    pub expression: String,
}

impl FieldSpec {
    /// Build a field spec, parsing its display format.
    ///
    /// Labels and units end up as whitespace-separated tokens in the table
    /// file, so neither may be empty or contain whitespace.
    pub fn new(label: &str, unit: &str, format: &str, expression: &str) -> Result<Self> {
        for (what, token) in [("label", label), ("unit", unit)] {
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                return Err(MdoError::config(format!(
                    "field {} '{}' must be a single non-empty word",
                    what, token
                )));
            }
        }
        Ok(Self {
            label: label.to_string(),
            unit: unit.to_string(),
            format: format.parse()?,
            expression: expression.to_string(),
        })
    }
}

/// Experiment records with their column metadata.
///
/// Every record has one value per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentTable {
    pub labels: Vec<String>,
    pub units: Vec<String>,
    pub formats: Vec<FieldFormat>,
    pub records: Vec<Vec<f64>>,
}

impl ExperimentTable {
    /// Empty table with the columns of `fields`.
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            labels: fields.iter().map(|f| f.label.clone()).collect(),
            units: fields.iter().map(|f| f.unit.clone()).collect(),
            formats: fields.iter().map(|f| f.format).collect(),
            records: Vec::new(),
        }
    }

    /// Append one record. Panics in debug builds on a column count mismatch.
    pub fn push(&mut self, record: Vec<f64>) {
        debug_assert_eq!(record.len(), self.labels.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column index of `label`.
    pub fn index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Like [`index`](Self::index) but a missing label is a config error.
    pub fn require(&self, label: &str) -> Result<usize> {
        self.index(label)
            .ok_or_else(|| MdoError::config(format!("no field '{}' in experiment table", label)))
    }

    /// All values of one column.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let i = self.index(label)?;
        Some(self.records.iter().map(|r| r[i]).collect())
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file_error = |source| MdoError::FileWrite {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(file_error)?;
        let mut writer = TableWriter::new(BufWriter::new(file), &self.formats);
        writer.write_header(&self.labels, &self.units).map_err(file_error)?;
        for record in &self.records {
            writer.write_record(record).map_err(file_error)?;
        }
        writer.flush().map_err(file_error)
    }

    /// Re-read a table written by [`write`](Self::write).
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| MdoError::FileRead {
            path: path.display().to_string(),
            source,
        })?;

        let mut header: Vec<Vec<String>> = Vec::with_capacity(3);
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| MdoError::FileRead {
                path: path.display().to_string(),
                source,
            })?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            if header.len() < 3 {
                if let Some(first) = header.first() {
                    if tokens.len() != first.len() {
                        return Err(MdoError::table(
                            line_no,
                            format!("expected {} columns, found {}", first.len(), tokens.len()),
                        ));
                    }
                }
                header.push(tokens.iter().map(|t| t.to_string()).collect());
                continue;
            }

            let width = header[0].len();
            if tokens.len() != width {
                return Err(MdoError::table(
                    line_no,
                    format!("expected {} values, found {}", width, tokens.len()),
                ));
            }
            let record = tokens
                .iter()
                .map(|t| {
                    t.parse::<f64>()
                        .map_err(|_| MdoError::table(line_no, format!("'{}' is not a number", t)))
                })
                .collect::<Result<Vec<_>>>()?;
            records.push(record);
        }

        if header.len() < 3 {
            return Err(MdoError::table(
                header.len() + 1,
                "missing header (labels, units and formats lines)",
            ));
        }
        let formats = header[2]
            .iter()
            .map(|f| f.parse::<FieldFormat>().map_err(|_| MdoError::table(3, format!("bad format '{}'", f))))
            .collect::<Result<Vec<_>>>()?;
        let mut header = header.into_iter();
        Ok(Self {
            labels: header.next().unwrap_or_default(),
            units: header.next().unwrap_or_default(),
            formats,
            records,
        })
    }
}

/// Streams a table to any writer, one formatted line at a time.
pub struct TableWriter<'a, W: Write> {
    w: W,
    formats: &'a [FieldFormat],
}

impl<'a, W: Write> TableWriter<'a, W> {
    pub fn new(w: W, formats: &'a [FieldFormat]) -> Self {
        Self { w, formats }
    }

    /// Labels, units and formats lines, padded to the column widths.
    pub fn write_header(&mut self, labels: &[String], units: &[String]) -> std::io::Result<()> {
        let formats: Vec<String> = self.formats.iter().map(|f| f.to_string()).collect();
        for row in [labels, units, formats.as_slice()] {
            let cells: Vec<String> = row
                .iter()
                .zip(self.formats)
                .map(|(cell, f)| format!("{:>width$}", cell, width = f.width))
                .collect();
            writeln!(self.w, "{}", cells.join(" "))?;
        }
        Ok(())
    }

    pub fn write_record(&mut self, record: &[f64]) -> std::io::Result<()> {
        let cells: Vec<String> = record
            .iter()
            .zip(self.formats)
            .map(|(&v, f)| f.format(v))
            .collect();
        writeln!(self.w, "{}", cells.join(" "))
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.w.flush()
    }
}
