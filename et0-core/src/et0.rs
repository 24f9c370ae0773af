use serde::{Deserialize, Serialize};

/// Inputs for the ET₀ estimate, all in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Et0Inputs {
    pub max_temperature_c: f64,
    pub min_temperature_c: f64,
    pub relative_humidity_pct: f64,
    pub wind_speed_ms: f64,
    /// MJ m⁻² day⁻¹; treated as zero when absent.
    pub solar_radiation: Option<f64>,
}

impl Et0Inputs {
    pub fn mean_temperature_c(&self) -> f64 {
        (self.max_temperature_c + self.min_temperature_c) / 2.0
    }
}

/// Reference evapotranspiration in mm/day.
///
/// NOTE: this is a placeholder, a fixed linear combination of mean
/// temperature, solar radiation, wind speed and humidity. It is not the
/// FAO-56 Penman-Monteith equation and its output should not be used for
/// irrigation scheduling.
pub fn estimate_et0(inputs: &Et0Inputs) -> f64 {
    let t_mean = inputs.mean_temperature_c();
    let rs = inputs.solar_radiation.unwrap_or(0.0);

    let et0 = 0.16 * t_mean + 0.11 * rs + 0.28 * inputs.wind_speed_ms
        - 0.012 * inputs.relative_humidity_pct
        + 0.35;

    et0.max(0.0)
}
