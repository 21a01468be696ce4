//! Display conversions. The normalized model stays in SI; only callers that
//! render values for people go through these helpers.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::SettingsError;

const MPS_TO_MPH: f64 = 2.237;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature(&self, celsius: f64) -> f64 {
        match self {
            UnitSystem::Metric => celsius,
            UnitSystem::Imperial => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn speed(&self, mps: f64) -> f64 {
        match self {
            UnitSystem::Metric => mps,
            UnitSystem::Imperial => mps * MPS_TO_MPH,
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    /// Rounded temperature with its unit label, e.g. `"72°F"`.
    pub fn format_temperature(&self, celsius: f64) -> String {
        format!("{}{}", self.temperature(celsius).round(), self.temperature_label())
    }

    pub fn format_speed(&self, mps: f64) -> String {
        format!("{:.1} {}", self.speed(mps), self.speed_label())
    }
}

/// Visibility in kilometres with one decimal, regardless of unit system.
pub fn format_visibility(metres: f64) -> String {
    format!("{:.1} km", metres / 1000.0)
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(SettingsError::UnknownUnitSystem(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_is_identity() {
        assert_eq!(UnitSystem::Metric.temperature(21.5), 21.5);
        assert_eq!(UnitSystem::Metric.speed(4.0), 4.0);
        assert_eq!(UnitSystem::Metric.format_temperature(21.5), "22°");
    }

    #[test]
    fn imperial_conversions() {
        assert_eq!(UnitSystem::Imperial.temperature(100.0), 212.0);
        assert_eq!(UnitSystem::Imperial.format_temperature(22.0), "72°F");
        assert_eq!(UnitSystem::Imperial.format_speed(10.0), "22.4 mph");
    }

    #[test]
    fn visibility_is_in_km() {
        assert_eq!(format_visibility(10_000.0), "10.0 km");
        assert_eq!(format_visibility(2400.0), "2.4 km");
    }

    #[test]
    fn parse_unit_system() {
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!(matches!(
            "kelvin".parse::<UnitSystem>(),
            Err(SettingsError::UnknownUnitSystem(_))
        ));
    }
}
