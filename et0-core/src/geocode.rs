//! Geocoding facade: an ordered list of providers tried with fallback.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::instrument;

use crate::{
    Config,
    error::GeocodeError,
    geocode::{google::GoogleMapsProvider, nominatim::NominatimProvider},
    model::{Address, GeocodeResult, Location},
};

pub mod google;
pub mod nominatim;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Google,
    Nominatim,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::Nominatim => "nominatim",
        }
    }

    /// Default priority order.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Google, ProviderId::Nominatim]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "google" => Ok(ProviderId::Google),
            "nominatim" | "osm" => Ok(ProviderId::Nominatim),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: google, nominatim."
            )),
        }
    }
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Whether the provider can be used at all (e.g. an API key is set).
    fn is_available(&self) -> bool {
        true
    }

    /// Free-text search or autocomplete.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError>;

    async fn geocode_address(&self, address: &Address) -> Result<Vec<GeocodeResult>, GeocodeError>;

    async fn reverse(&self, location: Location) -> Result<GeocodeResult, GeocodeError>;

    /// Resolve a place reference returned by `search` into coordinates.
    async fn resolve_place(&self, _place_id: &str) -> Result<GeocodeResult, GeocodeError> {
        Err(GeocodeError::Unsupported { provider: self.id().as_str(), operation: "place lookup" })
    }
}

#[derive(Debug)]
pub struct Geocoder {
    providers: Vec<Box<dyn GeocodingProvider>>,
}

macro_rules! with_fallback {
    ($self:ident, $op:literal, |$p:ident| $call:expr) => {{
        let mut last_err: Option<GeocodeError> = None;
        for $p in $self.providers.iter().filter(|p| {
            let available = p.is_available();
            if !available {
                tracing::debug!(provider = %p.id(), "Skipping unavailable provider");
            }
            available
        }) {
            tracing::debug!(provider = %$p.id(), operation = $op, "Trying geocoding provider");
            match $call.await {
                Ok(value) => return Ok(value),
                // Never hides a real failure from an earlier provider.
                Err(e @ GeocodeError::Unsupported { .. }) => {
                    tracing::debug!(
                        provider = %$p.id(),
                        operation = $op,
                        "Provider does not support operation"
                    );
                    last_err.get_or_insert(e);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %$p.id(),
                        operation = $op,
                        error = %e,
                        "Geocoding provider failed, falling back"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(GeocodeError::NoProviderAvailable))
    }};
}

impl Geocoder {
    /// Providers are tried in the given order.
    pub fn new(providers: Vec<Box<dyn GeocodingProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn available_provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().filter(|p| p.is_available()).map(|p| p.id()).collect()
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::InvalidQuery("search text is empty".into()));
        }
        with_fallback!(self, "search", |p| p.search(query))
    }

    #[instrument(skip(self))]
    pub async fn geocode_address(
        &self,
        address: &Address,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        address.validate()?;
        with_fallback!(self, "geocode_address", |p| p.geocode_address(address))
    }

    #[instrument(skip(self))]
    pub async fn reverse(&self, location: Location) -> Result<GeocodeResult, GeocodeError> {
        location
            .validate()
            .map_err(|e| GeocodeError::InvalidQuery(e.to_string()))?;
        with_fallback!(self, "reverse", |p| p.reverse(location))
    }

    /// Resolve a place reference. Providers that never issue such references
    /// answer `Unsupported` and are skipped without masking earlier errors.
    #[instrument(skip(self))]
    pub async fn resolve_place(&self, place_id: &str) -> Result<GeocodeResult, GeocodeError> {
        with_fallback!(self, "resolve_place", |p| p.resolve_place(place_id))
    }

    /// Return the result with coordinates, resolving a place reference if
    /// the result still carries the (0, 0) sentinel.
    pub async fn ensure_resolved(
        &self,
        result: GeocodeResult,
    ) -> Result<GeocodeResult, GeocodeError> {
        match &result.place_id {
            Some(place_id) if !result.is_resolved() => self.resolve_place(place_id).await,
            _ => Ok(result),
        }
    }

    /// First search hit with coordinates; `NoResults` when nothing matched.
    pub async fn locate(&self, query: &str) -> Result<GeocodeResult, GeocodeError> {
        let first = self
            .search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults(query.trim().to_string()))?;
        let resolved = self.ensure_resolved(first).await?;
        tracing::info!(
            "Located '{}' at {}",
            resolved.formatted_address,
            resolved.location()
        );
        Ok(resolved)
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn GeocodingProvider>> {
    let boxed: Box<dyn GeocodingProvider> = match id {
        ProviderId::Google => {
            let mut provider =
                GoogleMapsProvider::new(config.google_api_key(), config.user_agent());
            if let Some(base) = &config.endpoints.google {
                provider = provider.with_base_url(base);
            }
            Box::new(provider)
        }
        ProviderId::Nominatim => {
            let mut provider = NominatimProvider::new(config.user_agent())?;
            if let Some(base) = &config.endpoints.nominatim {
                provider = provider.with_base_url(base);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// Build the facade with providers in the configured order.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<Geocoder> {
    let providers = config
        .provider_order()?
        .into_iter()
        .map(|id| provider_from_config(id, config))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Geocoder::new(providers))
}
