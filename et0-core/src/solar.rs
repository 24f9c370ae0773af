//! Extraterrestrial radiation estimate (FAO-56, eq. 21).
//!
//! Closed-form and independent of any fetched weather data.

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

/// Solar constant, MJ m⁻² min⁻¹.
const SOLAR_CONSTANT: f64 = 0.0820;

/// 1-based day of the year (1 = January 1st).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Extraterrestrial radiation Ra in MJ m⁻² day⁻¹ for a latitude in degrees
/// and a day of the year. Never negative; zero during polar night.
pub fn estimate_solar_radiation(latitude_deg: f64, day_of_year: u32) -> f64 {
    let phi = latitude_deg.clamp(-90.0, 90.0).to_radians();
    let j = f64::from(day_of_year);

    let angle = 2.0 * PI * j / 365.0;
    let inverse_distance = 1.0 + 0.033 * angle.cos();
    let declination = 0.409 * (angle - 1.39).sin();

    let sunset_hour_angle = (-phi.tan() * declination.tan()).clamp(-1.0, 1.0).acos();

    let ra = (24.0 * 60.0 / PI)
        * SOLAR_CONSTANT
        * inverse_distance
        * (sunset_hour_angle * phi.sin() * declination.sin()
            + phi.cos() * declination.cos() * sunset_hour_angle.sin());

    ra.max(0.0)
}
