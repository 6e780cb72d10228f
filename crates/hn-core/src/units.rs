//! Canonical SI quantities and the SI/US display unit systems.
//!
//! Model values are always stored in SI (Pa, m, m³/s). The model's `units`
//! setting only selects how values are presented.

use serde::{Deserialize, Serialize};
use std::fmt;
use uom::si::f64::{
    Length as UomLength, Pressure as UomPressure, Velocity as UomVelocity,
    VolumeRate as UomVolumeRate,
};

pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

pub mod constants {
    /// Standard gravity, m/s².
    pub const G0_MPS2: f64 = 9.806_65;
    pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;
}

/// Presentation unit system of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "US")]
    Us,
}

impl UnitSystem {
    pub fn pressure(self, p: Pressure) -> f64 {
        use uom::si::pressure::{kilopascal, pound_force_per_square_inch};
        match self {
            Self::Si => p.get::<kilopascal>(),
            Self::Us => p.get::<pound_force_per_square_inch>(),
        }
    }

    pub fn length(self, l: Length) -> f64 {
        use uom::si::length::{foot, meter};
        match self {
            Self::Si => l.get::<meter>(),
            Self::Us => l.get::<foot>(),
        }
    }

    pub fn flow(self, q: VolumeRate) -> f64 {
        use uom::si::volume_rate::{gallon_per_minute, liter_per_second};
        match self {
            Self::Si => q.get::<liter_per_second>(),
            Self::Us => q.get::<gallon_per_minute>(),
        }
    }

    pub fn velocity(self, v: Velocity) -> f64 {
        use uom::si::velocity::{foot_per_second, meter_per_second};
        match self {
            Self::Si => v.get::<meter_per_second>(),
            Self::Us => v.get::<foot_per_second>(),
        }
    }

    pub fn pressure_label(self) -> &'static str {
        match self {
            Self::Si => "kPa",
            Self::Us => "psi",
        }
    }

    pub fn length_label(self) -> &'static str {
        match self {
            Self::Si => "m",
            Self::Us => "ft",
        }
    }

    pub fn flow_label(self) -> &'static str {
        match self {
            Self::Si => "L/s",
            Self::Us => "gpm",
        }
    }

    pub fn velocity_label(self) -> &'static str {
        match self {
            Self::Si => "m/s",
            Self::Us => "ft/s",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Si => write!(f, "SI"),
            Self::Us => write!(f, "US"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn atmosphere_in_both_systems() {
        let p = pa(constants::STANDARD_ATMOSPHERE_PA);
        assert!(close(UnitSystem::Si.pressure(p), 101.325, 1e-9));
        assert!(close(UnitSystem::Us.pressure(p), 14.6959, 1e-3));
    }

    #[test]
    fn length_and_flow_conversions() {
        assert!(close(UnitSystem::Us.length(m(0.3048)), 1.0, 1e-9));
        assert!(close(UnitSystem::Si.flow(m3ps(0.01)), 10.0, 1e-9));
        assert!(close(UnitSystem::Us.flow(m3ps(0.01)), 158.503, 1e-2));
    }

    #[test]
    fn serde_uses_upper_case_tags() {
        assert_eq!(serde_json::to_string(&UnitSystem::Us).unwrap(), "\"US\"");
        let si: UnitSystem = serde_json::from_str("\"SI\"").unwrap();
        assert_eq!(si, UnitSystem::Si);
    }
}
