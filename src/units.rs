//! Unit conversion helpers.
//!
//! Every function is named `<to>_<from>`: `m_ft(x)` converts feet to meters,
//! `ft_m(x)` converts meters to feet. All internal state is SI.
//!
//! These are the only unit functions an expression may call, as
//! `unit.<name>(x)`. See [`lookup`].

#![allow(non_snake_case)]

const FOOT: f64 = 0.3048;
const NAUTICAL_MILE: f64 = 1852.0;
const KNOT: f64 = NAUTICAL_MILE / 3600.0;
const FEET_PER_MINUTE: f64 = FOOT / 60.0;
const ZERO_CELSIUS: f64 = 273.15;

pub fn m_ft(ft: f64) -> f64 {
    ft * FOOT
}

pub fn ft_m(m: f64) -> f64 {
    m / FOOT
}

pub fn m_NM(nm: f64) -> f64 {
    nm * NAUTICAL_MILE
}

pub fn NM_m(m: f64) -> f64 {
    m / NAUTICAL_MILE
}

pub fn m_km(km: f64) -> f64 {
    km * 1000.0
}

pub fn km_m(m: f64) -> f64 {
    m / 1000.0
}

pub fn mps_kt(kt: f64) -> f64 {
    kt * KNOT
}

pub fn kt_mps(mps: f64) -> f64 {
    mps / KNOT
}

pub fn mps_ftpmin(ftpmin: f64) -> f64 {
    ftpmin * FEET_PER_MINUTE
}

pub fn ftpmin_mps(mps: f64) -> f64 {
    mps / FEET_PER_MINUTE
}

pub fn N_kN(kn: f64) -> f64 {
    kn * 1000.0
}

pub fn kN_N(n: f64) -> f64 {
    n / 1000.0
}

pub fn N_daN(dan: f64) -> f64 {
    dan * 10.0
}

pub fn daN_N(n: f64) -> f64 {
    n / 10.0
}

pub fn s_min(min: f64) -> f64 {
    min * 60.0
}

pub fn min_s(s: f64) -> f64 {
    s / 60.0
}

pub fn s_h(h: f64) -> f64 {
    h * 3600.0
}

pub fn h_s(s: f64) -> f64 {
    s / 3600.0
}

pub fn pc_no_dim(x: f64) -> f64 {
    x * 100.0
}

pub fn no_dim_pc(pc: f64) -> f64 {
    pc / 100.0
}

pub fn kg_t(t: f64) -> f64 {
    t * 1000.0
}

pub fn t_kg(kg: f64) -> f64 {
    kg / 1000.0
}

pub fn m3_L(l: f64) -> f64 {
    l / 1000.0
}

pub fn L_m3(m3: f64) -> f64 {
    m3 * 1000.0
}

pub fn K_degC(c: f64) -> f64 {
    c + ZERO_CELSIUS
}

pub fn degC_K(k: f64) -> f64 {
    k - ZERO_CELSIUS
}

/// Fuel-efficiency metric conversion: kg/m to kg/km.
pub fn kgpkm_kgpm(x: f64) -> f64 {
    x * 1000.0
}

/// Table of every allowed unit function.
const UNIT_FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("m_ft", m_ft),
    ("ft_m", ft_m),
    ("m_NM", m_NM),
    ("NM_m", NM_m),
    ("m_km", m_km),
    ("km_m", km_m),
    ("mps_kt", mps_kt),
    ("kt_mps", kt_mps),
    ("mps_ftpmin", mps_ftpmin),
    ("ftpmin_mps", ftpmin_mps),
    ("N_kN", N_kN),
    ("kN_N", kN_N),
    ("N_daN", N_daN),
    ("daN_N", daN_N),
    ("s_min", s_min),
    ("min_s", min_s),
    ("s_h", s_h),
    ("h_s", h_s),
    ("pc_no_dim", pc_no_dim),
    ("no_dim_pc", no_dim_pc),
    ("kg_t", kg_t),
    ("t_kg", t_kg),
    ("m3_L", m3_L),
    ("L_m3", L_m3),
    ("K_degC", K_degC),
    ("degC_K", degC_K),
    ("kgpkm_kgpm", kgpkm_kgpm),
];

/// Look up a unit function by its bare name (without the `unit.` prefix).
pub fn lookup(name: &str) -> Option<fn(f64) -> f64> {
    UNIT_FUNCTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| *f)
}

/// Names of every unit function, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    UNIT_FUNCTIONS.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_pairs() {
        assert_relative_eq!(ft_m(m_ft(35000.0)), 35000.0, max_relative = 1e-12);
        assert_relative_eq!(kt_mps(mps_kt(137.0)), 137.0, max_relative = 1e-12);
        assert_relative_eq!(min_s(s_min(25.0)), 25.0, max_relative = 1e-12);
    }

    #[test]
    fn test_known_values() {
        assert_relative_eq!(m_ft(1000.0), 304.8, max_relative = 1e-12);
        assert_relative_eq!(m_NM(1800.0), 3_333_600.0, max_relative = 1e-12);
        assert_relative_eq!(mps_ftpmin(300.0), 1.524, max_relative = 1e-12);
        assert_relative_eq!(N_kN(121.0), 121_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_lookup() {
        let f = lookup("kt_mps").unwrap();
        assert_relative_eq!(f(mps_kt(250.0)), 250.0, max_relative = 1e-12);
        assert!(lookup("system").is_none());
        assert_eq!(names().count(), UNIT_FUNCTIONS.len());
    }
}
