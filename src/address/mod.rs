//! Design parameter accessor.
//!
//! Generic, late-bound access to the named numeric fields of a design state.
//! A state type describes its fields once, in a [`Registry`] of getter/setter
//! pairs keyed by dotted path (`aircraft.airframe.wing.area`). Optimization and
//! exploration code then reads and writes design variables and performance
//! outputs by path without per-field boilerplate.
//!
//! Reads and writes go straight through the live state; nothing is copied and
//! nothing is re-solved. After [`set`] the caller must re-run the MDA before
//! derived fields are consistent again.

mod registry;

pub use registry::{Field, Registry};

use crate::error::{MdoError, Result};

/// A state type whose scalars can be addressed by dotted path.
pub trait Addressable: Sized + 'static {
    /// The registration table for this type, built once.
    fn registry() -> &'static Registry<Self>;
}

/// Read the scalar at `path`.
pub fn get<S: Addressable>(state: &S, path: &str) -> Result<f64> {
    S::registry().get(state, path)
}

/// Write `value` to the scalar at `path`.
pub fn set<S: Addressable>(state: &mut S, path: &str, value: f64) -> Result<()> {
    S::registry().set(state, path, value)
}

/// Read several scalars at once, in order.
pub fn get_many<S: Addressable>(state: &S, paths: &[String]) -> Result<Vec<f64>> {
    paths.iter().map(|p| get(state, p)).collect()
}

/// Write several scalars at once. Fails before any write if a path is bad.
pub fn set_many<S: Addressable>(state: &mut S, paths: &[String], values: &[f64]) -> Result<()> {
    if paths.len() != values.len() {
        return Err(MdoError::config(format!(
            "{} paths but {} values",
            paths.len(),
            values.len()
        )));
    }
    let registry = S::registry();
    let fields = paths
        .iter()
        .map(|p| registry.resolve(p))
        .collect::<Result<Vec<_>>>()?;
    for (field, &value) in fields.iter().zip(values) {
        (field.set)(state, value);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::MdoError;
    use once_cell::sync::Lazy;

    #[derive(Debug, Default, Clone)]
    pub struct Wing {
        pub area: f64,
        pub span: f64,
    }

    #[derive(Debug, Default, Clone)]
    pub struct Plane {
        pub wing: Wing,
        pub mass: f64,
    }

    static PLANE_FIELDS: Lazy<Registry<Plane>> = Lazy::new(|| {
        let mut reg: Registry<Plane> = Registry::new("plane");
        crate::fields!(reg, Plane, "plane";
            wing.area,
            wing.span,
            mass,
        );
        reg
    });

    impl Addressable for Plane {
        fn registry() -> &'static Registry<Self> {
            &PLANE_FIELDS
        }
    }

    #[test]
    fn test_round_trip() {
        let mut plane = Plane::default();
        for &v in &[0.0, 164.0, -3.5, 1e-300, 123456.789] {
            set(&mut plane, "plane.wing.area", v).unwrap();
            assert_eq!(get(&plane, "plane.wing.area").unwrap(), v);
        }
        assert_eq!(plane.wing.area, 123456.789);
    }

    #[test]
    fn test_unknown_segment() {
        let plane = Plane::default();
        match get(&plane, "plane.wing.chord") {
            Err(MdoError::Address { segment, .. }) => assert_eq!(segment, "chord"),
            other => panic!("expected address error, got {:?}", other),
        }
        match get(&plane, "airplane.mass") {
            Err(MdoError::Address { segment, .. }) => assert_eq!(segment, "airplane"),
            other => panic!("expected address error, got {:?}", other),
        }
        match get(&plane, "plane.mass.kg") {
            Err(MdoError::Address { segment, .. }) => assert_eq!(segment, "kg"),
            other => panic!("expected address error, got {:?}", other),
        }
        match get(&plane, "plane.wing.area.root.le") {
            Err(MdoError::Address { segment, .. }) => assert_eq!(segment, "root"),
            other => panic!("expected address error, got {:?}", other),
        }
    }

    #[test]
    fn test_set_non_scalar() {
        let mut plane = Plane::default();
        let err = set(&mut plane, "plane.wing", 1.0).unwrap_err();
        assert!(matches!(err, MdoError::NotScalar { .. }));
        let err = get(&plane, "plane").unwrap_err();
        assert!(matches!(err, MdoError::NotScalar { .. }));
    }

    #[test]
    fn test_set_many_is_all_or_nothing() {
        let mut plane = Plane::default();
        let paths = vec!["plane.mass".to_string(), "plane.wing.twist".to_string()];
        assert!(set_many(&mut plane, &paths, &[5.0, 1.0]).is_err());
        assert_eq!(plane.mass, 0.0);

        let paths = vec!["plane.mass".to_string(), "plane.wing.span".to_string()];
        let err = set_many(&mut plane, &paths, &[5.0]).unwrap_err();
        assert!(matches!(err, MdoError::Config { .. }));
        assert_eq!(plane.mass, 0.0);

        set_many(&mut plane, &paths, &[5.0, 30.0]).unwrap();
        assert_eq!(get_many(&plane, &paths).unwrap(), vec![5.0, 30.0]);
    }

    #[test]
    fn test_registration_order() {
        let paths: Vec<_> = Plane::registry().paths().collect();
        assert_eq!(paths, vec!["plane.wing.area", "plane.wing.span", "plane.mass"]);
        assert_eq!(Plane::registry().len(), 3);
    }
}
