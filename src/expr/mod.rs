//! Restricted expression evaluator.
//!
//! Constraint, criterion and table expressions are short arithmetic strings
//! over the design state, for example:
//!
//! ```text
//! aircraft.performance.take_off.tofl_req - aircraft.performance.take_off.tofl_eff
//! unit.ftpmin_mps(aircraft.performance.mcl_ceiling.vz_eff)
//! aircraft.power_system.reference_thrust / 10.
//! ```
//!
//! # Grammar
//!
//! ```text
//! sum     = product { ('+' | '-') product }
//! product = unary { ('*' | '/') unary }
//! unary   = ('-' | '+') unary | power
//! power   = atom [ ('^' | '**') unary ]
//! atom    = number | name | name '(' [ sum { ',' sum } ] ')' | '(' sum ')'
//! name    = ident { '.' ident }
//! ```
//!
//! # Resolvable names
//!
//! The set of names an expression may use is closed:
//!
//! | Name | Meaning |
//! |------|---------|
//! | `<root>.<path>` | a scalar leaf of the state registry (e.g. `aircraft.weight_cg.mtow`) |
//! | `unit.<fn>(x)` | a unit conversion from [`crate::units`] |
//! | `abs`, `sqrt`, `exp`, `ln` | one-argument math |
//! | `min`, `max` | two-argument math |
//!
//! Every name is resolved when the expression is compiled, before anything is
//! evaluated. A path under the registry root that does not exist is an
//! [`MdoError::Address`]; any other unknown name is an [`MdoError::Evaluation`].
//! Evaluation only ever borrows the state immutably.

mod ast;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, Parser};

use std::fmt;

use crate::address::Addressable;
use crate::error::{MdoError, Result};
use crate::units;

/// Namespace prefix of the unit conversion functions.
pub const UNIT_NAMESPACE: &str = "unit";

/// Built-in math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Abs,
    Sqrt,
    Exp,
    Ln,
    Min,
    Max,
}

impl MathFn {
    /// Look up a math function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "sqrt" => Some(Self::Sqrt),
            "exp" => Some(Self::Exp),
            "ln" => Some(Self::Ln),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Abs => args[0].abs(),
            Self::Sqrt => args[0].sqrt(),
            Self::Exp => args[0].exp(),
            Self::Ln => args[0].ln(),
            Self::Min => args[0].min(args[1]),
            Self::Max => args[0].max(args[1]),
        }
    }
}

/// Resolved expression tree.
enum Node<S> {
    Const(f64),
    Field(fn(&S) -> f64),
    Neg(Box<Node<S>>),
    Binary(BinaryOp, Box<Node<S>>, Box<Node<S>>),
    Unit(fn(f64) -> f64, Box<Node<S>>),
    Math(MathFn, Vec<Node<S>>),
}

impl<S> Node<S> {
    fn eval(&self, state: &S) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::Field(get) => get(state),
            Node::Neg(inner) => -inner.eval(state),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(state), rhs.eval(state)),
            Node::Unit(f, arg) => f(arg.eval(state)),
            Node::Math(f, args) => {
                let values: Vec<f64> = args.iter().map(|a| a.eval(state)).collect();
                f.apply(&values)
            }
        }
    }
}

/// A compiled expression over a state type `S`.
pub struct Expression<S> {
    text: String,
    node: Node<S>,
}

impl<S> fmt::Debug for Expression<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.text).finish()
    }
}

impl<S: Addressable> Expression<S> {
    /// Parse `text` and resolve every name it uses.
    pub fn compile(text: &str) -> Result<Self> {
        let ast = parse(text)?;
        let node = resolve::<S>(&ast)?;
        Ok(Self {
            text: text.to_string(),
            node,
        })
    }

    /// Compile a list of expressions, failing on the first bad one.
    pub fn compile_all(texts: &[String]) -> Result<Vec<Self>> {
        texts.iter().map(|t| Self::compile(t)).collect()
    }
}

impl<S> Expression<S> {
    /// Evaluate against the current state.
    pub fn eval(&self, state: &S) -> f64 {
        self.node.eval(state)
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Compile and evaluate `text` in one go.
pub fn eval<S: Addressable>(state: &S, text: &str) -> Result<f64> {
    Ok(Expression::<S>::compile(text)?.eval(state))
}

fn resolve<S: Addressable>(expr: &Expr) -> Result<Node<S>> {
    let registry = S::registry();
    match expr {
        Expr::Number(v) => Ok(Node::Const(*v)),
        Expr::Name { name, .. } => {
            let root = name.split('.').next().unwrap_or_default();
            if root == registry.root() {
                Ok(Node::Field(registry.resolve(name)?.get))
            } else if root == UNIT_NAMESPACE || MathFn::from_name(name).is_some() {
                Err(MdoError::evaluation(name.as_str(), "function used as a value"))
            } else {
                Err(MdoError::evaluation(name.as_str(), "name is not in the allowed set"))
            }
        }
        Expr::Neg(inner) => Ok(Node::Neg(Box::new(resolve(inner)?))),
        Expr::Binary { op, lhs, rhs } => Ok(Node::Binary(
            *op,
            Box::new(resolve(lhs)?),
            Box::new(resolve(rhs)?),
        )),
        Expr::Call { name, args, .. } => {
            if let Some(unit_name) = name
                .strip_prefix(UNIT_NAMESPACE)
                .and_then(|rest| rest.strip_prefix('.'))
            {
                let f = units::lookup(unit_name).ok_or_else(|| {
                    MdoError::evaluation(name.as_str(), "unknown unit conversion")
                })?;
                check_arity(name, 1, args.len())?;
                return Ok(Node::Unit(f, Box::new(resolve(&args[0])?)));
            }
            if let Some(f) = MathFn::from_name(name) {
                check_arity(name, f.arity(), args.len())?;
                let args = args.iter().map(resolve).collect::<Result<Vec<_>>>()?;
                return Ok(Node::Math(f, args));
            }
            Err(MdoError::evaluation(name.as_str(), "function is not in the allowed set"))
        }
    }
}

fn check_arity(name: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(MdoError::evaluation(
            name,
            format!("expects {} argument(s), got {}", expected, got),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::tests::Plane;
    use approx::assert_relative_eq;

    fn plane() -> Plane {
        let mut p = Plane::default();
        p.wing.area = 120.0;
        p.wing.span = 30.0;
        p.mass = 70_000.0;
        p
    }

    #[test]
    fn test_arithmetic_over_fields() {
        let p = plane();
        assert_relative_eq!(eval(&p, "plane.wing.span^2 / plane.wing.area").unwrap(), 7.5);
        assert_relative_eq!(eval(&p, "-(plane.mass - 1000) * 2").unwrap(), -138_000.0);
        assert_relative_eq!(eval(&p, "2 ** 3 ** 2").unwrap(), 512.0);
        assert_relative_eq!(eval(&p, "max(plane.wing.area, 200.) + abs(-1)").unwrap(), 201.0);
    }

    #[test]
    fn test_unit_calls() {
        let p = plane();
        let v = eval(&p, "unit.ft_m(unit.m_ft(plane.wing.span))").unwrap();
        assert_relative_eq!(v, 30.0, max_relative = 1e-12);
        assert_relative_eq!(eval(&p, "unit.mps_ftpmin(100.)").unwrap(), 0.508, max_relative = 1e-12);
    }

    #[test]
    fn test_disallowed_names() {
        let p = plane();
        for text in [
            "os.system(1)",
            "__import__(1)",
            "unit.remove_all(plane.mass)",
            "eval(1)",
            "foo + 1",
            "unit.m_ft",
        ] {
            match eval(&p, text) {
                Err(MdoError::Evaluation { .. }) => {}
                other => panic!("{}: expected evaluation error, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_bad_addresses_and_arity() {
        let p = plane();
        assert!(matches!(eval(&p, "plane.wing.sweep"), Err(MdoError::Address { .. })));
        assert!(matches!(eval(&p, "plane.wing * 2"), Err(MdoError::NotScalar { .. })));
        assert!(matches!(eval(&p, "min(1)"), Err(MdoError::Evaluation { .. })));
        assert!(matches!(eval(&p, "unit.m_ft(1, 2)"), Err(MdoError::Evaluation { .. })));
    }

    #[test]
    fn test_compiled_expression_tracks_state() {
        let mut p = plane();
        let expr = Expression::<Plane>::compile("plane.mass / 1000").unwrap();
        assert_relative_eq!(expr.eval(&p), 70.0);
        p.mass = 75_000.0;
        assert_relative_eq!(expr.eval(&p), 75.0);
        assert_eq!(expr.text(), "plane.mass / 1000");
    }
}
