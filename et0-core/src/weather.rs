//! Weather facade over the api.weather.gov (NWS) forecast service.
//!
//! Strategy: forecast periods first, then the latest gridpoint values, then
//! fixed defaults. Temperatures are normalized to °C and wind to m/s as they
//! are read.

use chrono::{DateTime, Utc};
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    Config,
    error::WeatherError,
    http::{build_client, truncate_body},
    model::{
        Location, ProcessedWeatherData, SourceAttribution, SourceKind, Station, WeatherSources,
    },
    solar::{day_of_year, estimate_solar_radiation},
    units::{fahrenheit_to_celsius, feet_to_meters, kmh_to_ms, knots_to_ms, mph_to_ms},
};

const NWS_API_BASE: &str = "https://api.weather.gov";

pub const DEFAULT_RELATIVE_HUMIDITY: f64 = 50.0;
pub const DEFAULT_WIND_SPEED_MS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct WeatherService {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
    geometry: Option<PointGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    grid_id: Option<String>,
    grid_x: Option<i64>,
    grid_y: Option<i64>,
    forecast: Option<String>,
    forecast_grid_data: Option<String>,
    relative_location: Option<RelativeLocation>,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// GeoJSON order: [lon, lat].
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: RelativeLocationProperties,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationProperties {
    city: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    elevation: Option<QuantitativeValue>,
    #[serde(default)]
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    #[serde(default)]
    name: String,
    temperature: Option<PeriodTemperature>,
    temperature_unit: Option<String>,
    wind_speed: Option<PeriodWindSpeed>,
    relative_humidity: Option<QuantitativeValue>,
}

/// Plain number (with `temperatureUnit`) or a quantitative value, depending
/// on the forecast format the server chose.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PeriodTemperature {
    Number(f64),
    Quantity(QuantitativeValue),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PeriodWindSpeed {
    Text(String),
    Quantity(QuantitativeValue),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuantitativeValue {
    unit_code: Option<String>,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GridpointResponse {
    properties: GridpointProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridpointProperties {
    elevation: Option<QuantitativeValue>,
    relative_humidity: Option<GridSeries>,
    wind_speed: Option<GridSeries>,
}

#[derive(Debug, Deserialize)]
struct GridSeries {
    uom: Option<String>,
    #[serde(default)]
    values: Vec<GridValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridValue {
    /// ISO 8601 interval, e.g. "2024-06-01T12:00:00+00:00/PT1H".
    valid_time: String,
    value: Option<f64>,
}

/// A value derived from upstream data, with where it came from.
#[derive(Debug, Clone)]
struct Derived {
    value: f64,
    source: SourceAttribution,
}

impl WeatherService {
    pub fn new(user_agent: &str) -> Result<Self, WeatherError> {
        Ok(Self { http: build_client(user_agent)?, base_url: NWS_API_BASE.to_string() })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        tracing::debug!(%url, "NWS request");

        let res = self.http.get(url).header(ACCEPT, "application/geo+json").send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Schema(format!("could not parse {url}: {e}")))
    }

    /// Look up today's weather inputs for a location.
    #[instrument(skip(self))]
    pub async fn fetch(&self, location: Location) -> Result<ProcessedWeatherData, WeatherError> {
        self.fetch_at(location, Utc::now()).await
    }

    pub async fn fetch_at(
        &self,
        location: Location,
        now: DateTime<Utc>,
    ) -> Result<ProcessedWeatherData, WeatherError> {
        location.validate()?;

        let point_url =
            format!("{}/points/{:.4},{:.4}", self.base_url, location.latitude, location.longitude);
        let point: PointResponse = self.get_json(&point_url).await?;
        let props = point.properties;

        let forecast_url = props
            .forecast
            .clone()
            .ok_or_else(|| WeatherError::Schema("point has no forecast URL".into()))?;

        let forecast: ForecastResponse = self.get_json(&forecast_url).await?;
        let periods = periods_for_today(&forecast.properties.periods);
        if periods.is_empty() {
            return Err(WeatherError::Schema("forecast contains no periods".into()));
        }

        let (max_temperature, min_temperature) = temperature_range(periods, &forecast_url)?;
        let mut relative_humidity = average_humidity(periods, &forecast_url);
        let mut wind_speed = average_wind_speed(periods, &forecast_url);
        let mut elevation = forecast.properties.elevation.as_ref().and_then(elevation_meters);

        if relative_humidity.is_none() || wind_speed.is_none() || elevation.is_none() {
            if let Some(grid_url) = &props.forecast_grid_data {
                match self.get_json::<GridpointResponse>(grid_url).await {
                    Ok(grid) => {
                        let grid = grid.properties;
                        if relative_humidity.is_none() {
                            relative_humidity = grid
                                .relative_humidity
                                .as_ref()
                                .and_then(|s| latest_grid_value(s, now, grid_url, humidity_pct));
                        }
                        if wind_speed.is_none() {
                            wind_speed = grid
                                .wind_speed
                                .as_ref()
                                .and_then(|s| latest_grid_value(s, now, grid_url, speed_ms));
                        }
                        elevation = elevation
                            .or_else(|| grid.elevation.as_ref().and_then(elevation_meters));
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = %grid_url,
                            error = %e,
                            "Gridpoint lookup failed, using defaults"
                        );
                    }
                }
            }
        }

        let relative_humidity = relative_humidity.unwrap_or_else(|| Derived {
            value: DEFAULT_RELATIVE_HUMIDITY,
            source: SourceAttribution::default_value(format!("{DEFAULT_RELATIVE_HUMIDITY} %")),
        });
        let wind_speed = wind_speed.unwrap_or_else(|| Derived {
            value: DEFAULT_WIND_SPEED_MS,
            source: SourceAttribution::default_value(format!("{DEFAULT_WIND_SPEED_MS} m/s")),
        });

        let (station_lat, station_lon) = point
            .geometry
            .as_ref()
            .and_then(|g| match g.coordinates.as_slice() {
                [lon, lat, ..] => Some((*lat, *lon)),
                _ => None,
            })
            .unwrap_or((location.latitude, location.longitude));

        let station = station_from_point(&props, station_lat, station_lon, elevation);

        let day = day_of_year(now.date_naive());
        let solar_radiation = estimate_solar_radiation(location.latitude, day);
        let solar_source = SourceAttribution {
            kind: SourceKind::Estimate,
            url: None,
            periods: Vec::new(),
            raw_values: vec![format!("latitude {:.4}, day {day}", location.latitude)],
        };

        let data = ProcessedWeatherData {
            max_temperature: max_temperature.value,
            min_temperature: min_temperature.value,
            relative_humidity: relative_humidity.value,
            wind_speed: wind_speed.value,
            solar_radiation: Some(solar_radiation),
            station,
            timestamp: now,
            sources: Some(WeatherSources {
                max_temperature: Some(max_temperature.source),
                min_temperature: Some(min_temperature.source),
                relative_humidity: Some(relative_humidity.source),
                wind_speed: Some(wind_speed.source),
                solar_radiation: Some(solar_source),
            }),
        };

        tracing::info!(
            station = %data.station.id,
            max = data.max_temperature,
            min = data.min_temperature,
            "Weather data processed"
        );
        Ok(data)
    }
}

/// Construct the weather facade from config (User-Agent, endpoint override).
pub fn weather_service_from_config(config: &Config) -> anyhow::Result<WeatherService> {
    let mut service = WeatherService::new(config.user_agent())?;
    if let Some(base) = &config.endpoints.nws {
        service = service.with_base_url(base);
    }
    Ok(service)
}

/// Today and tonight (or tonight and tomorrow, late in the day).
fn periods_for_today(periods: &[ForecastPeriod]) -> &[ForecastPeriod] {
    &periods[..periods.len().min(2)]
}

fn station_from_point(
    props: &PointProperties,
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
) -> Station {
    let id = match (&props.grid_id, props.grid_x, props.grid_y) {
        (Some(office), Some(x), Some(y)) => format!("{office}/{x},{y}"),
        (Some(office), _, _) => office.clone(),
        _ => format!("{latitude:.4},{longitude:.4}"),
    };

    let name = props
        .relative_location
        .as_ref()
        .map(|r| &r.properties)
        .and_then(|p| match (&p.city, &p.state) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(city), None) => Some(city.clone()),
            _ => None,
        })
        .unwrap_or_else(|| id.clone());

    Station { id, name, latitude, longitude, elevation }
}

/// Celsius value and a raw description for one period's temperature.
fn period_temperature_c(period: &ForecastPeriod) -> Option<(f64, String)> {
    match period.temperature.as_ref()? {
        PeriodTemperature::Number(t) => {
            let unit = period.temperature_unit.as_deref().unwrap_or("F");
            let c = if unit.eq_ignore_ascii_case("C") { *t } else { fahrenheit_to_celsius(*t) };
            Some((c, format!("{t} {unit}")))
        }
        PeriodTemperature::Quantity(q) => {
            let v = q.value?;
            let code = q.unit_code.as_deref().unwrap_or("wmoUnit:degC");
            let c = if code.ends_with("degF") { fahrenheit_to_celsius(v) } else { v };
            Some((c, format!("{v} {code}")))
        }
    }
}

/// Converted to Celsius per period before taking max and min.
fn temperature_range(
    periods: &[ForecastPeriod],
    url: &str,
) -> Result<(Derived, Derived), WeatherError> {
    let temps: Vec<(&ForecastPeriod, f64, String)> = periods
        .iter()
        .filter_map(|p| period_temperature_c(p).map(|(c, raw)| (p, c, raw)))
        .collect();

    let source = |entry: &(&ForecastPeriod, f64, String)| Derived {
        value: entry.1,
        source: SourceAttribution {
            kind: SourceKind::ForecastPeriod,
            url: Some(url.to_string()),
            periods: vec![entry.0.name.clone()],
            raw_values: vec![entry.2.clone()],
        },
    };

    let max = temps
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| WeatherError::Schema("forecast periods have no temperatures".into()))?;
    let min = temps
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| WeatherError::Schema("forecast periods have no temperatures".into()))?;

    Ok((source(max), source(min)))
}

fn average_derived(samples: Vec<(&ForecastPeriod, f64, String)>, url: &str) -> Option<Derived> {
    if samples.is_empty() {
        return None;
    }
    let mean = samples.iter().map(|s| s.1).sum::<f64>() / samples.len() as f64;
    Some(Derived {
        value: mean,
        source: SourceAttribution {
            kind: SourceKind::ForecastPeriod,
            url: Some(url.to_string()),
            periods: samples.iter().map(|s| s.0.name.clone()).collect(),
            raw_values: samples.into_iter().map(|s| s.2).collect(),
        },
    })
}

fn average_humidity(periods: &[ForecastPeriod], url: &str) -> Option<Derived> {
    let samples = periods
        .iter()
        .filter_map(|p| {
            let rh = p.relative_humidity.as_ref()?;
            let v = rh.value?;
            Some((p, v, format!("{v} %")))
        })
        .collect();
    average_derived(samples, url)
}

fn average_wind_speed(periods: &[ForecastPeriod], url: &str) -> Option<Derived> {
    let samples = periods
        .iter()
        .filter_map(|p| match p.wind_speed.as_ref()? {
            PeriodWindSpeed::Text(text) => parse_wind_speed(text).map(|ms| (p, ms, text.clone())),
            PeriodWindSpeed::Quantity(q) => {
                let v = q.value?;
                let code = q.unit_code.as_deref().unwrap_or("wmoUnit:km_h-1");
                speed_ms(v, Some(code)).map(|ms| (p, ms, format!("{v} {code}")))
            }
        })
        .collect();
    average_derived(samples, url)
}

/// Parse NWS wind text like "10 mph", "5 to 10 mph" or "15 km/h" into m/s.
/// Ranges use the midpoint; mph is assumed when no unit is given.
pub fn parse_wind_speed(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let numbers: Vec<f64> = lower
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(|tok| tok.parse::<f64>().ok())
        .collect();

    let (lo, hi) = match numbers.as_slice() {
        [] => return None,
        [v] => (*v, *v),
        [first, .., last] => (*first, *last),
    };
    let value = (lo + hi) / 2.0;

    let ms = if lower.contains("km/h") || lower.contains("kph") {
        kmh_to_ms(value)
    } else if lower.contains("m/s") {
        value
    } else if lower.contains("kt") || lower.contains("knot") {
        knots_to_ms(value)
    } else {
        mph_to_ms(value)
    };
    Some(ms)
}

/// Convert a speed with a WMO unit code to m/s. Unknown units yield None.
fn speed_ms(value: f64, unit_code: Option<&str>) -> Option<f64> {
    match unit_code.map(|c| c.trim_start_matches("wmoUnit:")) {
        Some("km_h-1") | None => Some(kmh_to_ms(value)),
        Some("m_s-1") => Some(value),
        Some("mph") | Some("mi_h-1") => Some(mph_to_ms(value)),
        Some("kn") | Some("kt") => Some(knots_to_ms(value)),
        Some(other) => {
            tracing::warn!(unit = other, "Unknown wind speed unit");
            None
        }
    }
}

fn humidity_pct(value: f64, _unit_code: Option<&str>) -> Option<f64> {
    Some(value.clamp(0.0, 100.0))
}

fn elevation_meters(q: &QuantitativeValue) -> Option<f64> {
    let v = q.value?;
    match q.unit_code.as_deref() {
        Some(code) if code.ends_with(":ft") => Some(feet_to_meters(v)),
        _ => Some(v),
    }
}

fn valid_time_start(valid_time: &str) -> Option<DateTime<Utc>> {
    let start = valid_time.split('/').next()?;
    DateTime::parse_from_rfc3339(start).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Most recent value whose interval has started by `now`; the first value
/// when every interval lies in the future.
fn latest_grid_value(
    series: &GridSeries,
    now: DateTime<Utc>,
    url: &str,
    convert: fn(f64, Option<&str>) -> Option<f64>,
) -> Option<Derived> {
    let with_values = series
        .values
        .iter()
        .filter_map(|v| Some((v, v.value?, valid_time_start(&v.valid_time)?)));

    let (entry, raw, _) = with_values
        .clone()
        .filter(|(_, _, start)| *start <= now)
        .max_by_key(|(_, _, start)| *start)
        .or_else(|| with_values.min_by_key(|(_, _, start)| *start))?;

    let unit = series.uom.as_deref();
    let value = convert(raw, unit)?;

    Some(Derived {
        value,
        source: SourceAttribution {
            kind: SourceKind::Gridpoint,
            url: Some(url.to_string()),
            periods: vec![entry.valid_time.clone()],
            raw_values: vec![format!("{raw} {}", unit.unwrap_or(""))],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap()
    }

    fn fresno() -> Location {
        Location { latitude: 36.7378, longitude: -119.7871 }
    }

    async fn mount_point(server: &MockServer, with_grid: bool) {
        let base = server.uri();
        let mut props = serde_json::json!({
            "gridId": "HNX",
            "gridX": 53,
            "gridY": 100,
            "forecast": format!("{base}/gridpoints/HNX/53,100/forecast"),
            "relativeLocation": { "properties": { "city": "Fresno", "state": "CA" } }
        });
        if with_grid {
            props["forecastGridData"] = serde_json::json!(format!("{base}/gridpoints/HNX/53,100"));
        }
        Mock::given(method("GET"))
            .and(path("/points/36.7378,-119.7871"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": props,
                "geometry": { "type": "Point", "coordinates": [-119.7871, 36.7378] }
            })))
            .mount(server)
            .await;
    }

    async fn mount_forecast(server: &MockServer, periods: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/gridpoints/HNX/53,100/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {
                    "elevation": { "unitCode": "wmoUnit:m", "value": 94.18 },
                    "periods": periods
                }
            })))
            .mount(server)
            .await;
    }

    fn service(server: &MockServer) -> WeatherService {
        WeatherService::new("et0-test").unwrap().with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn fahrenheit_periods_are_converted_before_min_max() {
        let server = MockServer::start().await;
        mount_point(&server, false).await;
        mount_forecast(
            &server,
            serde_json::json!([
                {
                    "name": "Today", "temperature": 72, "temperatureUnit": "F",
                    "windSpeed": "10 mph",
                    "relativeHumidity": { "unitCode": "wmoUnit:percent", "value": 40 }
                },
                {
                    "name": "Tonight", "temperature": 54, "temperatureUnit": "F",
                    "windSpeed": "5 to 10 mph",
                    "relativeHumidity": { "unitCode": "wmoUnit:percent", "value": 60 }
                },
                {
                    "name": "Sunday", "temperature": 99, "temperatureUnit": "F",
                    "windSpeed": "30 mph"
                }
            ]),
        )
        .await;

        let data = service(&server).fetch_at(fresno(), now()).await.unwrap();

        assert!((data.max_temperature - 22.2).abs() < 0.05, "max {}", data.max_temperature);
        assert!((data.min_temperature - 12.2).abs() < 0.05, "min {}", data.min_temperature);
        assert!((data.relative_humidity - 50.0).abs() < 1e-9);
        // (10 + 7.5) / 2 mph
        assert!((data.wind_speed - mph_to_ms(8.75)).abs() < 1e-9);

        assert_eq!(data.station.id, "HNX/53,100");
        assert_eq!(data.station.name, "Fresno, CA");
        assert_eq!(data.station.elevation, Some(94.18));
        assert!(data.solar_radiation.unwrap() > 35.0);

        let sources = data.sources.unwrap();
        let max = sources.max_temperature.unwrap();
        assert_eq!(max.kind, SourceKind::ForecastPeriod);
        assert_eq!(max.periods, vec!["Today".to_string()]);
        assert_eq!(max.raw_values, vec!["72 F".to_string()]);
        assert_eq!(sources.wind_speed.unwrap().periods.len(), 2);
    }

    #[tokio::test]
    async fn gridpoint_fills_missing_humidity_and_wind() {
        let server = MockServer::start().await;
        mount_point(&server, true).await;
        mount_forecast(
            &server,
            serde_json::json!([
                { "name": "This Afternoon", "temperature": 30, "temperatureUnit": "C" },
                { "name": "Tonight", "temperature": 18, "temperatureUnit": "C" }
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/gridpoints/HNX/53,100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {
                    "relativeHumidity": {
                        "uom": "wmoUnit:percent",
                        "values": [
                            { "validTime": "2024-06-01T12:00:00+00:00/PT2H", "value": 35 },
                            { "validTime": "2024-06-01T14:00:00+00:00/PT1H", "value": 30 },
                            { "validTime": "2024-06-01T16:00:00+00:00/PT1H", "value": 25 }
                        ]
                    },
                    "windSpeed": {
                        "uom": "wmoUnit:km_h-1",
                        "values": [
                            { "validTime": "2024-06-01T13:00:00+00:00/PT3H", "value": 18 }
                        ]
                    }
                }
            })))
            .mount(&server)
            .await;

        let data = service(&server).fetch_at(fresno(), now()).await.unwrap();

        assert_eq!(data.max_temperature, 30.0);
        assert_eq!(data.min_temperature, 18.0);
        assert_eq!(data.relative_humidity, 30.0);
        assert!((data.wind_speed - 5.0).abs() < 1e-9);

        let sources = data.sources.unwrap();
        assert_eq!(sources.relative_humidity.unwrap().kind, SourceKind::Gridpoint);
        assert_eq!(sources.wind_speed.unwrap().kind, SourceKind::Gridpoint);
    }

    #[tokio::test]
    async fn defaults_when_no_humidity_or_wind_anywhere() {
        let server = MockServer::start().await;
        mount_point(&server, true).await;
        mount_forecast(
            &server,
            serde_json::json!([{ "name": "Today", "temperature": 80, "temperatureUnit": "F" }]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/gridpoints/HNX/53,100"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let data = service(&server).fetch_at(fresno(), now()).await.unwrap();

        assert_eq!(data.relative_humidity, DEFAULT_RELATIVE_HUMIDITY);
        assert_eq!(data.wind_speed, DEFAULT_WIND_SPEED_MS);
        assert_eq!(data.max_temperature, data.min_temperature);
        assert_eq!(data.sources.unwrap().relative_humidity.unwrap().kind, SourceKind::Default);
    }

    #[tokio::test]
    async fn point_outside_coverage_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "title": "Data Unavailable For Requested Point"
            })))
            .mount(&server)
            .await;

        let err = service(&server)
            .fetch_at(Location { latitude: 48.85, longitude: 2.35 }, now())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.user_message().contains("US coverage"));
    }

    #[tokio::test]
    async fn missing_forecast_url_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/points/36.7378,-119.7871"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "properties": {} })),
            )
            .mount(&server)
            .await;

        let err = service(&server).fetch_at(fresno(), now()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Schema(_)));
    }

    #[tokio::test]
    async fn invalid_location_is_rejected_without_request() {
        let server = MockServer::start().await;
        let err = service(&server)
            .fetch_at(Location { latitude: 95.0, longitude: 0.0 }, now())
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidLocation(_)));
    }

    #[test]
    fn wind_text_parsing() {
        assert!((parse_wind_speed("10 mph").unwrap() - 4.4704).abs() < 1e-3);
        assert!((parse_wind_speed("5 to 15 mph").unwrap() - mph_to_ms(10.0)).abs() < 1e-9);
        assert!((parse_wind_speed("36 km/h").unwrap() - 10.0).abs() < 1e-9);
        assert!((parse_wind_speed("3 m/s").unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(parse_wind_speed("Calm"), None);
        assert_eq!(parse_wind_speed(""), None);
    }

    #[test]
    fn quantitative_temperature_in_fahrenheit() {
        let period = ForecastPeriod {
            name: "Today".into(),
            temperature: Some(PeriodTemperature::Quantity(QuantitativeValue {
                unit_code: Some("wmoUnit:degF".into()),
                value: Some(212.0),
            })),
            temperature_unit: None,
            wind_speed: None,
            relative_humidity: None,
        };
        let (c, _) = period_temperature_c(&period).unwrap();
        assert!((c - 100.0).abs() < 1e-9);
    }

    #[test]
    fn future_only_grid_values_use_first() {
        let series = GridSeries {
            uom: Some("wmoUnit:m_s-1".into()),
            values: vec![
                GridValue { valid_time: "2024-06-02T00:00:00+00:00/PT1H".into(), value: Some(4.0) },
                GridValue { valid_time: "2024-06-01T18:00:00+00:00/PT1H".into(), value: Some(3.0) },
            ],
        };
        let d = latest_grid_value(&series, now(), "u", speed_ms).unwrap();
        assert_eq!(d.value, 3.0);
    }
}
