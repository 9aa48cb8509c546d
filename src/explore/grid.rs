//! Experiment grid construction.

use crate::error::{MdoError, Result};

/// Full factorial grid around a baseline.
///
/// Along each axis the values are `baseline + k * step * |baseline|` for
/// `k` in `-n..=n` (`n = points_per_side`), so `k = 0` is the baseline itself
/// and the grid has `(2n + 1)^d` points. A zero baseline uses an absolute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPolicy {
    pub points_per_side: usize,
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self { points_per_side: 1 }
    }
}

impl GridPolicy {
    pub fn new(points_per_side: usize) -> Self {
        Self { points_per_side }
    }

    /// Values along one axis, ascending for a positive baseline.
    pub fn axis(&self, baseline: f64, step: f64) -> Vec<f64> {
        let n = self.points_per_side as i64;
        let scale = if baseline == 0.0 { 1.0 } else { baseline.abs() };
        (-n..=n)
            .map(|k| {
                if k == 0 {
                    baseline
                } else {
                    baseline + k as f64 * step * scale
                }
            })
            .collect()
    }

    /// Number of grid points for `dimensions` variables.
    pub fn len(&self, dimensions: usize) -> usize {
        (2 * self.points_per_side + 1).pow(dimensions as u32)
    }

    /// Every grid point, first variable varying slowest.
    pub fn points(&self, baseline: &[f64], steps: &[f64]) -> Result<Vec<Vec<f64>>> {
        if baseline.len() != steps.len() {
            return Err(MdoError::config(format!(
                "{} variables but {} relative steps",
                baseline.len(),
                steps.len()
            )));
        }
        if let Some(bad) = steps.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(MdoError::config(format!("relative step must be positive, got {}", bad)));
        }

        let axes: Vec<Vec<f64>> = baseline
            .iter()
            .zip(steps)
            .map(|(&b, &s)| self.axis(b, s))
            .collect();
        for (axis, &b) in axes.iter().zip(baseline) {
            // Steps too small for the baseline's precision collapse onto it
            if axis.windows(2).any(|w| w[0] == w[1]) {
                return Err(MdoError::config(format!(
                    "relative step too small to move baseline {} off itself",
                    b
                )));
            }
        }

        let mut points: Vec<Vec<f64>> = vec![Vec::with_capacity(axes.len())];
        for axis in &axes {
            points = points
                .iter()
                .flat_map(|prefix| {
                    axis.iter().map(move |&v| {
                        let mut p = prefix.clone();
                        p.push(v);
                        p
                    })
                })
                .collect();
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_around_baseline() {
        let axis = GridPolicy::default().axis(100.0, 0.2);
        assert_eq!(axis.len(), 3);
        assert_relative_eq!(axis[0], 80.0);
        assert_eq!(axis[1], 100.0);
        assert_relative_eq!(axis[2], 120.0);

        let axis = GridPolicy::new(2).axis(0.0, 0.5);
        assert_eq!(axis, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_baseline_included_exactly_once() {
        let baseline = [121_000.0, 164.0];
        let policy = GridPolicy::new(2);
        let points = policy.points(&baseline, &[0.1, 0.05]).unwrap();

        assert_eq!(points.len(), policy.len(2));
        assert_eq!(points.len(), 25);
        assert_eq!(points.iter().filter(|p| p.as_slice() == baseline).count(), 1);
        // First variable varies slowest
        assert_eq!(points[0][0], points[4][0]);
        assert_ne!(points[0][1], points[1][1]);
    }

    #[test]
    fn test_density_follows_step() {
        let narrow = GridPolicy::default().axis(10.0, 0.05);
        let wide = GridPolicy::default().axis(10.0, 0.2);
        assert!(wide[2] - wide[0] > narrow[2] - narrow[0]);
    }

    #[test]
    fn test_invalid_steps() {
        let policy = GridPolicy::default();
        assert!(policy.points(&[1.0], &[0.0]).is_err());
        assert!(policy.points(&[1.0], &[-0.1]).is_err());
        assert!(policy.points(&[1.0, 2.0], &[0.1]).is_err());
    }

    #[test]
    fn test_step_below_precision_is_rejected() {
        let err = GridPolicy::default().points(&[100.0], &[1e-17]).unwrap_err();
        assert!(matches!(err, MdoError::Config { .. }));
        assert!(GridPolicy::new(3).points(&[100.0, 5.0], &[0.1, 1e-18]).is_err());
        assert_eq!(GridPolicy::default().points(&[100.0], &[1e-12]).unwrap().len(), 3);
    }
}
