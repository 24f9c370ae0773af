//! Calculator form state.
//!
//! Fields are stored in SI units; the unit preference only affects what is
//! shown and how typed values are read.

use et0_core::{
    Et0Inputs, GeocodeResult, ProcessedWeatherData, estimate_et0,
    units::{
        UnitPreferences, convert_input_length, convert_input_speed, convert_input_temperature,
        display_length, display_speed, display_temperature,
    },
};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CalculatorForm {
    pub max_temperature_c: Option<f64>,
    pub min_temperature_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    /// MJ m⁻² day⁻¹.
    pub solar_radiation: Option<f64>,
    pub elevation_m: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place: Option<String>,
    #[serde(skip)]
    pub units: UnitPreferences,
}

impl CalculatorForm {
    pub fn new(units: UnitPreferences) -> Self {
        Self { units, ..Default::default() }
    }

    pub fn input_max_temperature(&mut self, value: f64) {
        self.max_temperature_c = Some(convert_input_temperature(value, self.units.temperature));
    }

    pub fn input_min_temperature(&mut self, value: f64) {
        self.min_temperature_c = Some(convert_input_temperature(value, self.units.temperature));
    }

    pub fn input_wind_speed(&mut self, value: f64) {
        self.wind_speed_ms = Some(convert_input_speed(value, self.units.speed));
    }

    pub fn input_elevation(&mut self, value: f64) {
        self.elevation_m = Some(convert_input_length(value, self.units.length));
    }

    pub fn input_humidity(&mut self, value: f64) {
        self.relative_humidity_pct = Some(value.clamp(0.0, 100.0));
    }

    pub fn input_solar_radiation(&mut self, value: f64) {
        self.solar_radiation = Some(value.max(0.0));
    }

    pub fn shown_max_temperature(&self) -> Option<f64> {
        self.max_temperature_c.map(|c| display_temperature(c, self.units.temperature))
    }

    pub fn shown_min_temperature(&self) -> Option<f64> {
        self.min_temperature_c.map(|c| display_temperature(c, self.units.temperature))
    }

    pub fn shown_wind_speed(&self) -> Option<f64> {
        self.wind_speed_ms.map(|ms| display_speed(ms, self.units.speed))
    }

    pub fn shown_elevation(&self) -> Option<f64> {
        self.elevation_m.map(|m| display_length(m, self.units.length))
    }

    pub fn apply_location(&mut self, result: &GeocodeResult) {
        self.latitude = Some(result.latitude);
        self.longitude = Some(result.longitude);
        self.place = Some(result.formatted_address.clone());
    }

    /// Overwrite the weather fields with fetched values.
    pub fn apply_weather(&mut self, data: &ProcessedWeatherData) {
        self.max_temperature_c = Some(data.max_temperature);
        self.min_temperature_c = Some(data.min_temperature);
        self.relative_humidity_pct = Some(data.relative_humidity);
        self.wind_speed_ms = Some(data.wind_speed);
        if data.solar_radiation.is_some() {
            self.solar_radiation = data.solar_radiation;
        }
        if data.station.elevation.is_some() {
            self.elevation_m = data.station.elevation;
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.max_temperature_c.is_none() {
            missing.push("max temperature");
        }
        if self.min_temperature_c.is_none() {
            missing.push("min temperature");
        }
        if self.relative_humidity_pct.is_none() {
            missing.push("humidity");
        }
        if self.wind_speed_ms.is_none() {
            missing.push("wind speed");
        }
        missing
    }

    pub fn inputs(&self) -> Option<Et0Inputs> {
        Some(Et0Inputs {
            max_temperature_c: self.max_temperature_c?,
            min_temperature_c: self.min_temperature_c?,
            relative_humidity_pct: self.relative_humidity_pct?,
            wind_speed_ms: self.wind_speed_ms?,
            solar_radiation: self.solar_radiation,
        })
    }

    /// Recomputed from the current fields; `None` until all required fields are set.
    pub fn et0(&self) -> Option<f64> {
        self.inputs().map(|i| estimate_et0(&i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use et0_core::{
        model::{AddressComponents, Station},
        units::UnitSystem,
    };

    fn imperial() -> UnitPreferences {
        UnitSystem::Imperial.into()
    }

    #[test]
    fn inputs_are_stored_in_si() {
        let mut form = CalculatorForm::new(imperial());
        form.input_max_temperature(212.0);
        form.input_wind_speed(10.0);
        form.input_elevation(3280.839895);

        assert!((form.max_temperature_c.unwrap() - 100.0).abs() < 1e-9);
        assert!((form.wind_speed_ms.unwrap() - 4.4704).abs() < 1e-4);
        assert!((form.elevation_m.unwrap() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn toggling_units_does_not_drift_stored_values() {
        let mut form = CalculatorForm::new(UnitPreferences::default());
        form.input_max_temperature(21.5);

        for _ in 0..10 {
            form.units = imperial();
            let _ = form.shown_max_temperature();
            form.units = UnitPreferences::default();
        }
        assert_eq!(form.max_temperature_c, Some(21.5));

        form.units = imperial();
        let shown = form.shown_max_temperature().unwrap();
        form.input_max_temperature(shown);
        assert!((form.max_temperature_c.unwrap() - 21.5).abs() < 1e-9);
    }

    #[test]
    fn et0_waits_for_required_fields() {
        let mut form = CalculatorForm::new(UnitPreferences::default());
        assert_eq!(form.et0(), None);
        assert_eq!(form.missing_fields().len(), 4);

        form.input_max_temperature(30.0);
        form.input_min_temperature(20.0);
        form.input_humidity(50.0);
        assert_eq!(form.missing_fields(), vec!["wind speed"]);

        form.input_wind_speed(2.0);
        form.input_solar_radiation(20.0);
        assert!((form.et0().unwrap() - 6.51).abs() < 1e-9);
    }

    #[test]
    fn weather_and_location_populate_form() {
        let mut form = CalculatorForm::new(UnitPreferences::default());
        form.apply_location(&GeocodeResult {
            latitude: 36.74,
            longitude: -119.78,
            formatted_address: "Fresno, CA, USA".into(),
            components: AddressComponents::default(),
            place_id: None,
        });
        form.apply_weather(&ProcessedWeatherData {
            max_temperature: 22.2,
            min_temperature: 12.2,
            relative_humidity: 55.0,
            wind_speed: 3.0,
            solar_radiation: Some(38.0),
            station: Station {
                id: "HNX/53,100".into(),
                name: "Fresno, CA".into(),
                latitude: 36.74,
                longitude: -119.78,
                elevation: Some(94.0),
            },
            timestamp: Utc::now(),
            sources: None,
        });

        assert_eq!(form.place.as_deref(), Some("Fresno, CA, USA"));
        assert_eq!(form.elevation_m, Some(94.0));
        assert!(form.et0().is_some());
    }
}
