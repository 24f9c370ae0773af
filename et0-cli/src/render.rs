use et0_core::{
    GeocodeResult, ProcessedWeatherData,
    model::SourceAttribution,
    units::{UnitPreferences, display_length, display_speed, display_temperature},
};

use crate::form::CalculatorForm;

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn geocode_results(results: &[GeocodeResult]) {
    if results.is_empty() {
        println!("No locations found.");
        return;
    }
    for (i, r) in results.iter().enumerate() {
        if r.is_resolved() {
            println!(
                "{:>2}. {}  ({:.4}, {:.4})",
                i + 1,
                r.formatted_address,
                r.latitude,
                r.longitude
            );
        } else {
            println!(
                "{:>2}. {}  (place {}, use --resolve for coordinates)",
                i + 1,
                r.formatted_address,
                r.place_id.as_deref().unwrap_or("?")
            );
        }
    }
}

pub fn weather(data: &ProcessedWeatherData, units: UnitPreferences, show_sources: bool) {
    let t = units.temperature;
    println!("Station:      {} ({})", data.station.name, data.station.id);
    if let Some(elev) = data.station.elevation {
        println!(
            "Elevation:    {:.0} {}",
            display_length(elev, units.length),
            units.length.symbol()
        );
    }
    println!("Max temp:     {:.1} {}", display_temperature(data.max_temperature, t), t.symbol());
    println!("Min temp:     {:.1} {}", display_temperature(data.min_temperature, t), t.symbol());
    println!("Humidity:     {:.0} %", data.relative_humidity);
    println!(
        "Wind speed:   {:.1} {}",
        display_speed(data.wind_speed, units.speed),
        units.speed.symbol()
    );
    if let Some(rs) = data.solar_radiation {
        println!("Solar rad.:   {rs:.1} MJ/m²/day");
    }
    println!("Retrieved:    {}", data.timestamp.format("%Y-%m-%d %H:%M UTC"));

    if show_sources {
        if let Some(sources) = &data.sources {
            println!();
            println!("Sources:");
            source_line("max temp", sources.max_temperature.as_ref());
            source_line("min temp", sources.min_temperature.as_ref());
            source_line("humidity", sources.relative_humidity.as_ref());
            source_line("wind speed", sources.wind_speed.as_ref());
            source_line("solar rad.", sources.solar_radiation.as_ref());
        }
    }
}

fn source_line(label: &str, source: Option<&SourceAttribution>) {
    let Some(s) = source else {
        return;
    };
    let mut line = format!("  {label:<11} {:?}", s.kind);
    if !s.periods.is_empty() {
        line.push_str(&format!(" [{}]", s.periods.join(", ")));
    }
    if !s.raw_values.is_empty() {
        line.push_str(&format!(" raw: {}", s.raw_values.join(", ")));
    }
    if let Some(url) = &s.url {
        line.push_str(&format!(" <{url}>"));
    }
    println!("{line}");
}

fn field(value: Option<f64>, precision: usize, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.precision$} {unit}"),
        None => "-".to_string(),
    }
}

pub fn form(form: &CalculatorForm) {
    let u = form.units;
    if let Some(place) = &form.place {
        println!("Location:     {place}");
    }
    if let (Some(lat), Some(lon)) = (form.latitude, form.longitude) {
        println!("Coordinates:  {lat:.4}, {lon:.4}");
    }
    println!("Max temp:     {}", field(form.shown_max_temperature(), 1, u.temperature.symbol()));
    println!("Min temp:     {}", field(form.shown_min_temperature(), 1, u.temperature.symbol()));
    println!("Humidity:     {}", field(form.relative_humidity_pct, 0, "%"));
    println!("Wind speed:   {}", field(form.shown_wind_speed(), 1, u.speed.symbol()));
    println!("Solar rad.:   {}", field(form.solar_radiation, 1, "MJ/m²/day"));
    println!("Elevation:    {}", field(form.shown_elevation(), 0, u.length.symbol()));
    println!();

    match form.et0() {
        Some(et0) => println!("ET₀ ≈ {et0:.2} mm/day (simplified estimate, not Penman-Monteith)"),
        None => println!("ET₀: missing {}", form.missing_fields().join(", ")),
    }
}
