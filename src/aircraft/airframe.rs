//! Airframe components.
//!
//! Plain data: every field is either a design input (areas, ratios,
//! correction factors) or an output written by a discipline. Lengths in m,
//! areas in m2, masses in kg.

/// Fuselage.
#[derive(Debug, Clone)]
pub struct Body {
    /// Seats abreast
    pub n_abreast: f64,
    pub n_aisle: f64,
    pub width: f64,
    pub cabin_length: f64,
    pub nose_length: f64,
    pub tail_length: f64,
    pub length: f64,
    /// length / width
    pub aspect_ratio: f64,
    pub wetted_area: f64,
    pub mass: f64,
    pub mass_correction_factor: f64,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            n_abreast: 6.0,
            n_aisle: 1.0,
            width: 0.0,
            cabin_length: 0.0,
            nose_length: 0.0,
            tail_length: 0.0,
            length: 0.0,
            aspect_ratio: 0.0,
            wetted_area: 0.0,
            mass: 0.0,
            mass_correction_factor: 1.0,
        }
    }
}

/// Main wing.
#[derive(Debug, Clone)]
pub struct Wing {
    /// Reference area, design variable
    pub area: f64,
    /// span^2 / area, design variable (7 to 12)
    pub aspect_ratio: f64,
    pub span: f64,
    /// Mean aerodynamic chord
    pub mac: f64,
    /// Quarter chord sweep, rad
    pub sweep25: f64,
    /// Thickness to chord ratio
    pub toc: f64,
    pub wetted_area: f64,
    pub mass: f64,
    pub mass_correction_factor: f64,
}

impl Default for Wing {
    fn default() -> Self {
        Self {
            area: 122.0,
            aspect_ratio: 9.0,
            span: 0.0,
            mac: 0.0,
            sweep25: 25f64.to_radians(),
            toc: 0.12,
            wetted_area: 0.0,
            mass: 0.0,
            mass_correction_factor: 1.0,
        }
    }
}

/// Fuel tank set (one tank, or two for pods).
#[derive(Debug, Clone)]
pub struct Tank {
    /// Starting length of one cylindrical tank, before the first sizing
    pub ref_length: f64,
    /// Overall length of one cylindrical tank
    pub length: f64,
    pub diameter: f64,
    pub count: f64,
    /// Total external volume of all tanks, m3
    pub gross_volume: f64,
    /// Tanks hold `mfw_factor` times the nominal mission fuel. Scales the
    /// usable box volume for wing box tanks.
    pub mfw_factor: f64,
    /// Usable fuel volume / gross volume (0.6 to 0.85 for LH2)
    pub volumetric_index: f64,
    /// Fuel mass / (fuel + tank structure) mass (0.25 to 0.305 for LH2)
    pub gravimetric_index: f64,
    /// Stored fuel density, kg/m3
    pub fuel_density: f64,
    /// Wetted area when outside the fuselage
    pub wetted_area: f64,
    pub mass: f64,
}

impl Default for Tank {
    fn default() -> Self {
        Self {
            ref_length: 15.0,
            length: 0.0,
            diameter: 0.0,
            count: 1.0,
            gross_volume: 0.0,
            mfw_factor: 1.0,
            volumetric_index: 1.0,
            gravimetric_index: 1.0,
            fuel_density: 803.0,
            wetted_area: 0.0,
            mass: 0.0,
        }
    }
}

impl Tank {
    /// Fuel mass the tanks hold when full.
    pub fn capacity(&self) -> f64 {
        self.gross_volume * self.volumetric_index * self.fuel_density
    }

    /// Gross volume of one cylinder with hemispherical ends.
    pub fn cylinder_volume(diameter: f64, length: f64) -> f64 {
        let d = diameter;
        let barrel = (length - d).max(0.0);
        std::f64::consts::PI * d * d * d / 6.0 + std::f64::consts::PI * d * d / 4.0 * barrel
    }

    /// Length of one cylinder with hemispherical ends holding `volume`.
    pub fn cylinder_length(diameter: f64, volume: f64) -> f64 {
        let d = diameter;
        let ends = std::f64::consts::PI * d * d * d / 6.0;
        d + (volume - ends).max(0.0) / (std::f64::consts::PI * d * d / 4.0)
    }
}

/// Horizontal or vertical tail.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    /// Tail volume coefficient
    pub volume_factor: f64,
    /// Distance from wing to tail aerodynamic centres
    pub lever_arm: f64,
    pub area: f64,
    pub wetted_area: f64,
    pub mass: f64,
    pub mass_correction_factor: f64,
}

impl Stabilizer {
    pub fn horizontal() -> Self {
        Self {
            volume_factor: 1.0,
            lever_arm: 0.0,
            area: 0.0,
            wetted_area: 0.0,
            mass: 0.0,
            mass_correction_factor: 1.0,
        }
    }

    pub fn vertical() -> Self {
        Self {
            volume_factor: 0.087,
            ..Self::horizontal()
        }
    }
}

/// One engine nacelle, engine included.
#[derive(Debug, Clone)]
pub struct Nacelle {
    /// Bypass ratio (5 to 12)
    pub engine_bpr: f64,
    pub diameter: f64,
    pub length: f64,
    pub wetted_area: f64,
    /// Engine plus nacelle and pylon
    pub mass: f64,
}

impl Default for Nacelle {
    fn default() -> Self {
        Self {
            engine_bpr: 9.0,
            diameter: 0.0,
            length: 0.0,
            wetted_area: 0.0,
            mass: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LandingGear {
    pub mass: f64,
    pub mass_correction_factor: f64,
}

impl Default for LandingGear {
    fn default() -> Self {
        Self {
            mass: 0.0,
            mass_correction_factor: 1.0,
        }
    }
}

/// All structural components.
#[derive(Debug, Clone)]
pub struct Airframe {
    pub body: Body,
    pub wing: Wing,
    pub tank: Tank,
    pub horizontal_stab: Stabilizer,
    pub vertical_stab: Stabilizer,
    pub nacelle: Nacelle,
    pub landing_gear: LandingGear,
}

impl Default for Airframe {
    fn default() -> Self {
        Self {
            body: Body::default(),
            wing: Wing::default(),
            tank: Tank::default(),
            horizontal_stab: Stabilizer::horizontal(),
            vertical_stab: Stabilizer::vertical(),
            nacelle: Nacelle::default(),
            landing_gear: LandingGear::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cylinder_length_inverts_volume() {
        let d = 3.5;
        for &length in &[3.5, 6.0, 12.0] {
            let v = Tank::cylinder_volume(d, length);
            assert_relative_eq!(Tank::cylinder_length(d, v), length, max_relative = 1e-12);
        }
        // Sphere when the volume is too small for a barrel
        assert_relative_eq!(Tank::cylinder_length(d, 1.0), d);
    }

    #[test]
    fn test_capacity() {
        let tank = Tank {
            gross_volume: 100.0,
            volumetric_index: 0.845,
            fuel_density: 70.8,
            ..Tank::default()
        };
        assert_relative_eq!(tank.capacity(), 5982.6, max_relative = 1e-9);
    }
}
