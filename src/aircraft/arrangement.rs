//! Qualitative architecture choices.
//!
//! An [`Arrangement`] is fixed when the aircraft is built and never changes
//! afterwards. Only the tube-and-wing turbofan family is modelled; other
//! combinations are rejected by [`Arrangement::validate`].

use serde::{Deserialize, Serialize};

use crate::error::{MdoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    #[default]
    Fuselage,
    Blended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WingType {
    #[default]
    Classic,
    Blended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WingAttachment {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabArchitecture {
    #[default]
    Classic,
    TTail,
    HTail,
}

/// Where the fuel is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankArchitecture {
    /// Integral wing tanks, capacity fixed by the wing box
    #[default]
    WingBox,
    /// Cylindrical tank behind the cabin, lengthens the fuselage
    Rear,
    /// Cylindrical tank on top of the fuselage
    PiggyBack,
    /// Two under-wing pods
    Pods,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberOfEngine {
    #[default]
    Twin,
    Quadri,
    Hexa,
}

impl NumberOfEngine {
    pub fn count(self) -> f64 {
        match self {
            Self::Twin => 2.0,
            Self::Quadri => 4.0,
            Self::Hexa => 6.0,
        }
    }

    /// Regulatory one-engine-inoperative climb gradient.
    pub fn oei_path_req(self) -> f64 {
        match self {
            Self::Twin => 0.011,
            Self::Quadri => 0.016,
            Self::Hexa => 0.019,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NacelleAttachment {
    #[default]
    Wing,
    Rear,
    Pods,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerArchitecture {
    #[default]
    Tf,
    Tp,
    Ef,
    Ep,
    Pte,
    Extf,
    Exef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSource {
    #[default]
    Fuel,
    Battery,
    FuelCell,
}

/// Fuel and its storage properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    #[default]
    Kerosene,
    LiquidH2,
    #[serde(alias = "Compressed_h2")]
    CompressedH2,
    Battery,
}

impl FuelType {
    /// Stored density, kg/m3.
    pub fn density(self) -> f64 {
        match self {
            Self::Kerosene => 803.0,
            Self::LiquidH2 => 70.8,
            Self::CompressedH2 => 40.0,
            Self::Battery => 2800.0,
        }
    }

    /// Lower heating value, J/kg.
    pub fn heating_value(self) -> f64 {
        match self {
            Self::Kerosene => 43.1e6,
            Self::LiquidH2 | Self::CompressedH2 => 121.0e6,
            Self::Battery => 0.0,
        }
    }

    /// Whether the fuel needs a dedicated cylindrical tank.
    pub fn is_hydrogen(self) -> bool {
        matches!(self, Self::LiquidH2 | Self::CompressedH2)
    }
}

/// The full set of architecture choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrangement {
    pub body_type: BodyType,
    pub wing_type: WingType,
    pub wing_attachment: WingAttachment,
    pub stab_architecture: StabArchitecture,
    pub tank_architecture: TankArchitecture,
    pub number_of_engine: NumberOfEngine,
    pub nacelle_attachment: NacelleAttachment,
    pub power_architecture: PowerArchitecture,
    pub power_source: PowerSource,
    pub fuel_type: FuelType,
}

impl Arrangement {
    /// The hydrogen medium-range turbofan layout: rear LH2 tank, twin
    /// wing-mounted turbofans, classic tail.
    pub fn h2_turbofan() -> Self {
        Self {
            tank_architecture: TankArchitecture::Rear,
            fuel_type: FuelType::LiquidH2,
            ..Self::default()
        }
    }

    /// Reject combinations outside the turbofan model.
    pub fn validate(&self) -> Result<()> {
        if self.body_type != BodyType::Fuselage || self.wing_type != WingType::Classic {
            return Err(MdoError::config("only fuselage bodies with classic wings are modelled"));
        }
        if self.power_architecture != PowerArchitecture::Tf || self.power_source != PowerSource::Fuel {
            return Err(MdoError::config(format!(
                "power architecture {:?} with source {:?} is not modelled, use tf/fuel",
                self.power_architecture, self.power_source
            )));
        }
        if self.fuel_type == FuelType::Battery {
            return Err(MdoError::config("battery is not a turbofan fuel"));
        }
        if self.fuel_type.is_hydrogen() && self.tank_architecture == TankArchitecture::WingBox {
            return Err(MdoError::config("hydrogen needs a rear, piggy_back or pods tank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_snake_case() {
        let agmt: Arrangement = toml::from_str(
            r#"
            tank_architecture = "piggy_back"
            number_of_engine = "quadri"
            fuel_type = "liquid_h2"
            stab_architecture = "t_tail"
            "#,
        )
        .unwrap();
        assert_eq!(agmt.tank_architecture, TankArchitecture::PiggyBack);
        assert_eq!(agmt.number_of_engine.count(), 4.0);
        assert_eq!(agmt.stab_architecture, StabArchitecture::TTail);
        assert_eq!(agmt.body_type, BodyType::Fuselage);
        assert!(agmt.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(Arrangement::default().validate().is_ok());
        assert!(Arrangement::h2_turbofan().validate().is_ok());

        let h2_in_wing = Arrangement {
            fuel_type: FuelType::LiquidH2,
            ..Arrangement::default()
        };
        assert!(h2_in_wing.validate().is_err());

        let electric = Arrangement {
            power_architecture: PowerArchitecture::Ef,
            ..Arrangement::h2_turbofan()
        };
        assert!(matches!(electric.validate(), Err(MdoError::Config { .. })));
    }
}
