//! Unit conversions and display helpers.
//!
//! Values are stored in SI (°C, m, m/s) everywhere in the crate. The helpers
//! below convert to and from the user's preferred display units.

use serde::{Deserialize, Serialize};

const FEET_PER_METER: f64 = 3.280_839_895;
const MPH_PER_MS: f64 = 2.236_936_292;
const MS_PER_KMH: f64 = 1.0 / 3.6;
const MS_PER_KNOT: f64 = 0.514_444;

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn meters_to_feet(m: f64) -> f64 {
    m * FEET_PER_METER
}

pub fn feet_to_meters(ft: f64) -> f64 {
    ft / FEET_PER_METER
}

pub fn ms_to_mph(ms: f64) -> f64 {
    ms * MPH_PER_MS
}

pub fn mph_to_ms(mph: f64) -> f64 {
    mph / MPH_PER_MS
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh * MS_PER_KMH
}

pub fn knots_to_ms(kn: f64) -> f64 {
    kn * MS_PER_KNOT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Meters,
    Feet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    #[serde(rename = "m/s")]
    MetersPerSecond,
    Mph,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl LengthUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Feet => "ft",
        }
    }
}

impl SpeedUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::Mph => "mph",
        }
    }
}

/// Metric or imperial, as stored in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Metric => f.write_str("metric"),
            UnitSystem::Imperial => f.write_str("imperial"),
        }
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Per-quantity display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub length: LengthUnit,
    pub speed: SpeedUnit,
}

impl Default for UnitPreferences {
    fn default() -> Self {
        UnitSystem::Metric.into()
    }
}

impl From<UnitSystem> for UnitPreferences {
    fn from(system: UnitSystem) -> Self {
        match system {
            UnitSystem::Metric => Self {
                temperature: TemperatureUnit::Celsius,
                length: LengthUnit::Meters,
                speed: SpeedUnit::MetersPerSecond,
            },
            UnitSystem::Imperial => Self {
                temperature: TemperatureUnit::Fahrenheit,
                length: LengthUnit::Feet,
                speed: SpeedUnit::Mph,
            },
        }
    }
}

/// Convert a stored Celsius value into the display unit.
pub fn display_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
    }
}

/// Convert a value typed in `unit` back to Celsius for storage.
pub fn convert_input_temperature(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(value),
    }
}

pub fn display_length(meters: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Meters => meters,
        LengthUnit::Feet => meters_to_feet(meters),
    }
}

pub fn convert_input_length(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Meters => value,
        LengthUnit::Feet => feet_to_meters(value),
    }
}

pub fn display_speed(ms: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::MetersPerSecond => ms,
        SpeedUnit::Mph => ms_to_mph(ms),
    }
}

pub fn convert_input_speed(value: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::MetersPerSecond => value,
        SpeedUnit::Mph => mph_to_ms(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn samples() -> impl Iterator<Item = f64> {
        (-400..=400).map(|i| i as f64 * 0.37)
    }

    #[test]
    fn fixed_points() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < EPS);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < EPS);
        assert!((fahrenheit_to_celsius(-40.0) + 40.0).abs() < EPS);
    }

    #[test]
    fn temperature_roundtrip() {
        for x in samples() {
            assert!((celsius_to_fahrenheit(fahrenheit_to_celsius(x)) - x).abs() < EPS);
        }
    }

    #[test]
    fn length_and_speed_roundtrip() {
        for x in samples() {
            assert!((meters_to_feet(feet_to_meters(x)) - x).abs() < EPS);
            assert!((ms_to_mph(mph_to_ms(x)) - x).abs() < EPS);
        }
    }

    #[test]
    fn display_then_input_is_identity_for_same_unit() {
        for unit in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            for x in samples() {
                let shown = display_temperature(x, unit);
                assert!((convert_input_temperature(shown, unit) - x).abs() < EPS);
            }
        }
        for unit in [LengthUnit::Meters, LengthUnit::Feet] {
            let shown = display_length(1234.5, unit);
            assert!((convert_input_length(shown, unit) - 1234.5).abs() < EPS);
        }
        for unit in [SpeedUnit::MetersPerSecond, SpeedUnit::Mph] {
            let shown = display_speed(4.2, unit);
            assert!((convert_input_speed(shown, unit) - 4.2).abs() < EPS);
        }
    }

    #[test]
    fn common_wind_units() {
        assert!((kmh_to_ms(36.0) - 10.0).abs() < EPS);
        assert!((mph_to_ms(10.0) - 4.4704).abs() < 1e-4);
        assert!((knots_to_ms(10.0) - 5.14444).abs() < 1e-4);
    }

    #[test]
    fn unit_system_parsing() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        let err = UnitSystem::try_from("nautical").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));

        let prefs = UnitPreferences::from(UnitSystem::Imperial);
        assert_eq!(prefs.temperature, TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.speed.symbol(), "mph");
    }
}
