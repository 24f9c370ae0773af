//! Error types surfaced by the geocoding and weather facades.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No results found for '{0}'")]
    NoResults(String),

    #[error("{provider} request failed with status {status}: {message}")]
    Http { provider: &'static str, status: u16, message: String },

    #[error("{provider} returned status {status}: {message}")]
    Upstream { provider: &'static str, status: String, message: String },

    #[error("Unexpected response: {0}")]
    Schema(String),

    #[error("Failed to load {0}")]
    LoadFailed(String),

    #[error("Timed out loading {0}")]
    LoadTimeout(String),

    #[error("{provider} does not support {operation}")]
    Unsupported { provider: &'static str, operation: &'static str },

    #[error("No geocoding provider is available")]
    NoProviderAvailable,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GeocodeError {
    /// Human-readable message for display next to the location form.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuery(_) => "Please enter a place to search for.".to_string(),
            Self::InvalidAddress(msg) => format!("Please complete the address: {msg}."),
            Self::NoResults(q) => format!("No locations found for \"{q}\"."),
            Self::Http { provider, status, .. } => {
                format!(
                    "The {provider} geocoding service returned HTTP {status}. Please try again."
                )
            }
            Self::Upstream { provider, status, message } if message.is_empty() => {
                format!("The {provider} geocoding service rejected the request ({status}).")
            }
            Self::Upstream { provider, status, message } => {
                format!(
                    "The {provider} geocoding service rejected the request ({status}): {message}"
                )
            }
            Self::Schema(_) => "The geocoding service returned an unexpected response.".to_string(),
            Self::LoadFailed(what) | Self::LoadTimeout(what) => {
                format!("Could not load {what}. Check your connection and API key.")
            }
            Self::Unsupported { provider, operation } => {
                format!("{provider} cannot perform {operation}.")
            }
            Self::NoProviderAvailable => {
                "No geocoding service is configured or reachable.".to_string()
            }
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Upstream HTTP status, when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Weather service request to {url} failed with status {status}: {message}")]
    Http { url: String, status: u16, message: String },

    #[error("Unexpected weather response: {0}")]
    Schema(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WeatherError {
    /// Human-readable message for display next to the weather form.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidLocation(msg) => format!("Invalid coordinates: {msg}."),
            // api.weather.gov answers 404 for points outside its coverage.
            Self::Http { status: 404, .. } => {
                "No forecast is available for this location (US coverage only).".to_string()
            }
            Self::Http { status, .. } => {
                format!("The weather service returned HTTP {status}. Please try again.")
            }
            Self::Schema(msg) => format!("The weather service returned incomplete data: {msg}."),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_user_messages() {
        let err = GeocodeError::NoResults("Atlantis".into());
        assert!(err.user_message().contains("Atlantis"));

        let err =
            GeocodeError::Http { provider: "nominatim", status: 429, message: "slow down".into() };
        assert!(err.user_message().contains("429"));
        assert_eq!(err.status_code(), Some(429));
    }

    #[test]
    fn upstream_error_includes_message() {
        let err = GeocodeError::Upstream {
            provider: "google",
            status: "REQUEST_DENIED".into(),
            message: "The provided API key is invalid.".into(),
        };
        let msg = err.user_message();
        assert!(msg.contains("REQUEST_DENIED"));
        assert!(msg.contains("API key is invalid"));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn weather_404_mentions_coverage() {
        let err = WeatherError::Http { url: "x".into(), status: 404, message: String::new() };
        assert!(err.user_message().contains("US coverage"));
        assert_eq!(err.status_code(), Some(404));
    }
}
