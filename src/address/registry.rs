//! Path-to-accessor registration table.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{MdoError, Result};

/// Getter/setter pair for one numeric leaf.
pub struct Field<S> {
    pub get: fn(&S) -> f64,
    pub set: fn(&mut S, f64),
}

impl<S> Clone for Field<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Field<S> {}

impl<S> fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").finish_non_exhaustive()
    }
}

/// Every addressable scalar of a state type, keyed by dotted path.
///
/// Built once per type. Paths always start with the registry root
/// (e.g. `aircraft.`). Interior prefixes are remembered so that a path naming
/// a sub-object can be told apart from a path that does not exist at all.
pub struct Registry<S> {
    root: String,
    fields: HashMap<String, Field<S>>,
    order: Vec<String>,
    nodes: HashSet<String>,
}

impl<S> Registry<S> {
    /// Create an empty registry rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut nodes = HashSet::new();
        nodes.insert(root.clone());
        Self {
            root,
            fields: HashMap::new(),
            order: Vec::new(),
            nodes,
        }
    }

    /// Root segment shared by all paths.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Register a numeric leaf.
    ///
    /// Panics if `path` is not under the root or is registered twice: both are
    /// programming errors in the registration table, not runtime conditions.
    pub fn field(&mut self, path: &str, get: fn(&S) -> f64, set: fn(&mut S, f64)) -> &mut Self {
        assert!(
            path.starts_with(&self.root) && path[self.root.len()..].starts_with('.'),
            "field '{}' is not under root '{}'",
            path,
            self.root
        );
        assert!(!self.fields.contains_key(path), "field '{}' registered twice", path);

        let mut prefix_end = 0;
        for (idx, ch) in path.char_indices() {
            if ch == '.' {
                prefix_end = idx;
                self.nodes.insert(path[..prefix_end].to_string());
            }
        }
        debug_assert!(prefix_end > 0);

        self.fields.insert(path.to_string(), Field { get, set });
        self.order.push(path.to_string());
        self
    }

    /// Resolve a path to its accessor pair.
    pub fn resolve(&self, path: &str) -> Result<Field<S>> {
        if let Some(field) = self.fields.get(path) {
            return Ok(*field);
        }
        if self.nodes.contains(path) {
            return Err(MdoError::not_scalar(path));
        }

        // Report the first segment that does not exist
        let mut prefix = String::new();
        let mut segments = path.split('.');
        while let Some(segment) = segments.next() {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            if self.fields.contains_key(&prefix) {
                // A leaf has no children
                let next = segments.next().unwrap_or(segment);
                return Err(MdoError::address(path, next));
            }
            if !self.nodes.contains(&prefix) {
                return Err(MdoError::address(path, segment));
            }
        }
        Err(MdoError::address(path, path))
    }

    /// Whether `path` names a numeric leaf.
    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Read a scalar.
    pub fn get(&self, state: &S, path: &str) -> Result<f64> {
        let field = self.resolve(path)?;
        Ok((field.get)(state))
    }

    /// Write a scalar in place. No derived field is recomputed.
    pub fn set(&self, state: &mut S, path: &str, value: f64) -> Result<()> {
        let field = self.resolve(path)?;
        (field.set)(state, value);
        Ok(())
    }

    /// All leaf paths in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered leaves.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no leaf has been registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Register a batch of leaves whose paths mirror the struct field chain.
///
/// ```ignore
/// fields!(registry, Aircraft, "aircraft";
///     airframe.wing.area,
///     weight_cg.mtow,
/// );
/// ```
#[macro_export]
macro_rules! fields {
    ($registry:expr, $state:ty, $root:literal; $( $($seg:ident).+ ),* $(,)?) => {
        $(
            $registry.field(
                concat!($root $(, ".", stringify!($seg))+),
                |s: &$state| s $(.$seg)+,
                |s: &mut $state, v: f64| s $(.$seg)+ = v,
            );
        )*
    };
}
