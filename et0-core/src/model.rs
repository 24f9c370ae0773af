use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, WeatherError};

/// Structured address; `city` and `state` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl Address {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self { city: city.into(), state: state.into(), ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), GeocodeError> {
        if self.city.trim().is_empty() {
            return Err(GeocodeError::InvalidAddress("city is required".into()));
        }
        if self.state.trim().is_empty() {
            return Err(GeocodeError::InvalidAddress("state is required".into()));
        }
        Ok(())
    }

    /// Single-line form, e.g. "1 Main St, Fresno, CA 93721, USA".
    pub fn one_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(street) = non_empty(&self.street) {
            parts.push(street.to_string());
        }
        parts.push(self.city.trim().to_string());
        match non_empty(&self.postal_code) {
            Some(zip) => parts.push(format!("{} {}", self.state.trim(), zip)),
            None => parts.push(self.state.trim().to_string()),
        }
        if let Some(country) = non_empty(&self.country) {
            parts.push(country.to_string());
        }
        parts.join(", ")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parsed address components of a geocoding result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub street_number: Option<String>,
    pub route: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub components: AddressComponents,
    /// Provider-specific place reference, set when coordinates still need
    /// to be resolved.
    pub place_id: Option<String>,
}

impl GeocodeResult {
    /// `false` for a place reference still carrying the (0, 0) sentinel.
    pub fn is_resolved(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0 && self.place_id.is_some())
    }

    pub fn location(&self) -> Location {
        Location { latitude: self.latitude, longitude: self.longitude }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let loc = Self { latitude, longitude };
        loc.validate()?;
        Ok(loc)
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidLocation(format!(
                "latitude {} is outside -90..90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidLocation(format!(
                "longitude {} is outside -180..180",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Grid cell / station the weather values were taken for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ForecastPeriod,
    Gridpoint,
    Default,
    Estimate,
}

/// Where a derived number came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub kind: SourceKind,
    pub url: Option<String>,
    /// Forecast period names, e.g. "Today", "Tonight".
    pub periods: Vec<String>,
    /// Raw upstream values with units, e.g. "72 F" or "10 to 15 mph".
    pub raw_values: Vec<String>,
}

impl SourceAttribution {
    pub fn default_value(raw: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Default,
            url: None,
            periods: Vec::new(),
            raw_values: vec![raw.into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSources {
    pub max_temperature: Option<SourceAttribution>,
    pub min_temperature: Option<SourceAttribution>,
    pub relative_humidity: Option<SourceAttribution>,
    pub wind_speed: Option<SourceAttribution>,
    pub solar_radiation: Option<SourceAttribution>,
}

/// Weather inputs for the calculator. Temperatures are always °C and wind
/// speed always m/s, whatever the upstream unit was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedWeatherData {
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub relative_humidity: f64,
    pub wind_speed: f64,
    /// MJ m⁻² day⁻¹.
    pub solar_radiation: Option<f64>,
    pub station: Station,
    pub timestamp: DateTime<Utc>,
    pub sources: Option<WeatherSources>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_requires_city_and_state() {
        assert!(Address::new("Fresno", "CA").validate().is_ok());

        let err = Address::new(" ", "CA").validate().unwrap_err();
        assert!(err.to_string().contains("city is required"));

        let err = Address::new("Fresno", "").validate().unwrap_err();
        assert!(err.to_string().contains("state is required"));
    }

    #[test]
    fn address_one_line_skips_empty_parts() {
        let mut addr = Address::new("Fresno", "CA");
        assert_eq!(addr.one_line(), "Fresno, CA");

        addr.street = Some("2500 Tulare St".into());
        addr.postal_code = Some("93721".into());
        addr.country = Some("  ".into());
        assert_eq!(addr.one_line(), "2500 Tulare St, Fresno, CA 93721");
    }

    #[test]
    fn place_reference_is_unresolved() {
        let mut result = GeocodeResult {
            latitude: 0.0,
            longitude: 0.0,
            formatted_address: "Fresno, CA, USA".into(),
            components: AddressComponents::default(),
            place_id: Some("abc".into()),
        };
        assert!(!result.is_resolved());

        result.latitude = 36.74;
        result.longitude = -119.78;
        assert!(result.is_resolved());
    }

    #[test]
    fn location_bounds() {
        assert!(Location::new(36.7, -119.8).is_ok());
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -181.0).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }
}
