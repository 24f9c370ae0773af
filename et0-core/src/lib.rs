//! Core library for the `et0` calculator.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The geocoding facade and its providers (Google Maps, Nominatim)
//! - The weather facade over api.weather.gov
//! - Unit conversions, the solar radiation estimate and the ET₀ formula
//!
//! It is used by `et0-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod et0;
pub mod geocode;
pub mod http;
pub mod load_once;
pub mod model;
pub mod solar;
pub mod units;
pub mod weather;

pub use config::{Config, ProviderConfig};
pub use error::{GeocodeError, WeatherError};
pub use et0::{Et0Inputs, estimate_et0};
pub use geocode::{Geocoder, GeocodingProvider, ProviderId, geocoder_from_config};
pub use model::{Address, GeocodeResult, Location, ProcessedWeatherData};
pub use weather::{WeatherService, weather_service_from_config};
