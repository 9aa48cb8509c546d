//! printf-style display formats for table fields.

use std::fmt;
use std::str::FromStr;

use crate::error::{MdoError, Result};

/// Conversion character of a [`FieldFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `%W.Pf`
    Fixed,
    /// `%W.Pe`
    Exponent,
    /// `%Wd`
    Integer,
}

/// A parsed `%W.Pf`, `%W.Pe` or `%Wd` spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFormat {
    pub width: usize,
    pub precision: usize,
    pub conversion: Conversion,
}

impl FieldFormat {
    /// Render `value` right-aligned in the field width.
    pub fn format(&self, value: f64) -> String {
        let width = self.width;
        if !value.is_finite() {
            return format!("{:>width$}", value);
        }
        match self.conversion {
            Conversion::Fixed => format!("{:>width$.prec$}", value, prec = self.precision),
            Conversion::Exponent => format!("{:>width$}", c_exponent(value, self.precision)),
            Conversion::Integer => format!("{:>width$}", value.round() as i64),
        }
    }
}

/// `1.5e3` → `1.500e+03`, the way C prints it.
fn c_exponent(value: f64, precision: usize) -> String {
    let rust = format!("{:.prec$e}", value, prec = precision);
    match rust.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rust,
    }
}

impl FromStr for FieldFormat {
    type Err = MdoError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || MdoError::config(format!("unsupported display format '{}'", s));

        let body = s.trim().strip_prefix('%').ok_or_else(bad)?;
        let conversion = match body.chars().last() {
            Some('f') => Conversion::Fixed,
            Some('e') => Conversion::Exponent,
            Some('d') => Conversion::Integer,
            _ => return Err(bad()),
        };
        let spec = &body[..body.len() - 1];
        let (width, precision) = match spec.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (spec, None),
        };

        let width = if width.is_empty() { 0 } else { width.parse().map_err(|_| bad())? };
        let precision = match (precision, conversion) {
            (Some(_), Conversion::Integer) => return Err(bad()),
            (Some(p), _) => p.parse().map_err(|_| bad())?,
            (None, Conversion::Integer) => 0,
            (None, _) => 6,
        };

        Ok(Self {
            width,
            precision,
            conversion,
        })
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.conversion {
            Conversion::Fixed => write!(f, "%{}.{}f", self.width, self.precision),
            Conversion::Exponent => write!(f, "%{}.{}e", self.width, self.precision),
            Conversion::Integer => write!(f, "%{}d", self.width),
        }
    }
}
