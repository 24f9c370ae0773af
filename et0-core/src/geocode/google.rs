//! Google Maps adapter: Places autocomplete for search, Place Details for
//! resolving place references, and the Geocoding API for addresses and
//! reverse lookups.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::GeocodeError,
    http::{build_client, truncate_body},
    load_once::LoadOnce,
    model::{Address, AddressComponents, GeocodeResult, Location},
};

use super::{GeocodingProvider, ProviderId};

const GOOGLE_MAPS_URL: &str = "https://maps.googleapis.com";
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);
const DETAILS_FIELDS: &str = "geometry,formatted_address,address_components";

#[derive(Debug)]
pub struct GoogleMapsProvider {
    api_key: Option<String>,
    user_agent: String,
    base_url: String,
    session: LoadOnce<Client>,
}

impl GoogleMapsProvider {
    /// The HTTP session is created lazily on first use.
    pub fn new(api_key: Option<String>, user_agent: &str) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            user_agent: user_agent.to_string(),
            base_url: GOOGLE_MAPS_URL.to_string(),
            session: LoadOnce::new("Google Maps API", LOAD_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn session(&self) -> Result<&Client, GeocodeError> {
        self.session
            .get_or_load(|| async {
                build_client(&self.user_agent)
                    .map_err(|e| GeocodeError::LoadFailed(format!("Google Maps API: {e}")))
            })
            .await
    }

    async fn get<T: DeserializeOwned + GmStatus>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, GeocodeError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            GeocodeError::LoadFailed("Google Maps API (no API key configured)".into())
        })?;

        let url = format!("{}/maps/api/{}/json", self.base_url, endpoint);
        tracing::debug!(%url, ?query, "Google Maps request");

        let res =
            self.session().await?.get(&url).query(query).query(&[("key", key)]).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(GeocodeError::Http {
                provider: "google",
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::Schema(format!("Google {endpoint}: {e}")))?;

        match parsed.status() {
            "OK" => Ok(Some(parsed)),
            "ZERO_RESULTS" => Ok(None),
            other => Err(GeocodeError::Upstream {
                provider: "google",
                status: other.to_string(),
                message: parsed.error_message().unwrap_or_default().to_string(),
            }),
        }
    }

    async fn geocode(&self, query: &[(&str, &str)]) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let reply: Option<GmGeocodeResponse> = self.get("geocode", query).await?;
        Ok(reply
            .map(|r| r.results.into_iter().map(GeocodeResult::from).collect())
            .unwrap_or_default())
    }
}

trait GmStatus {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! impl_gm_status {
    ($($ty:ty),*) => {$(
        impl GmStatus for $ty {
            fn status(&self) -> &str {
                &self.status
            }
            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }
        }
    )*};
}

impl_gm_status!(GmAutocompleteResponse, GmDetailsResponse, GmGeocodeResponse);

#[derive(Debug, Deserialize)]
struct GmAutocompleteResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<GmPrediction>,
}

#[derive(Debug, Deserialize)]
struct GmPrediction {
    description: String,
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct GmDetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<GmPlace>,
}

#[derive(Debug, Deserialize)]
struct GmGeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GmPlace>,
}

#[derive(Debug, Deserialize)]
struct GmPlace {
    formatted_address: String,
    geometry: GmGeometry,
    #[serde(default)]
    address_components: Vec<GmAddressComponent>,
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmGeometry {
    location: GmLatLng,
}

#[derive(Debug, Deserialize)]
struct GmLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GmAddressComponent {
    long_name: String,
    short_name: String,
    types: Vec<String>,
}

fn parse_components(raw: Vec<GmAddressComponent>) -> AddressComponents {
    let mut out = AddressComponents::default();
    for c in raw {
        let has = |t: &str| c.types.iter().any(|x| x == t);
        if has("street_number") {
            out.street_number = Some(c.long_name);
        } else if has("route") {
            out.route = Some(c.long_name);
        } else if has("locality") || (has("postal_town") && out.city.is_none()) {
            out.city = Some(c.long_name);
        } else if has("administrative_area_level_2") {
            out.county = Some(c.long_name);
        } else if has("administrative_area_level_1") {
            out.state = Some(c.short_name);
        } else if has("country") {
            out.country = Some(c.short_name);
        } else if has("postal_code") {
            out.postal_code = Some(c.long_name);
        }
    }
    out
}

impl From<GmPlace> for GeocodeResult {
    fn from(place: GmPlace) -> Self {
        GeocodeResult {
            latitude: place.geometry.location.lat,
            longitude: place.geometry.location.lng,
            formatted_address: place.formatted_address,
            components: parse_components(place.address_components),
            place_id: place.place_id,
        }
    }
}

#[async_trait]
impl GeocodingProvider for GoogleMapsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Autocomplete predictions carry a place reference but no coordinates,
    /// so they come back with the (0, 0) sentinel.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let reply: Option<GmAutocompleteResponse> =
            self.get("place/autocomplete", &[("input", query)]).await?;

        Ok(reply
            .map(|r| r.predictions)
            .unwrap_or_default()
            .into_iter()
            .map(|p| GeocodeResult {
                latitude: 0.0,
                longitude: 0.0,
                formatted_address: p.description,
                components: AddressComponents::default(),
                place_id: Some(p.place_id),
            })
            .collect())
    }

    async fn geocode_address(&self, address: &Address) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let one_line = address.one_line();
        self.geocode(&[("address", one_line.as_str())]).await
    }

    async fn reverse(&self, location: Location) -> Result<GeocodeResult, GeocodeError> {
        let latlng = format!("{},{}", location.latitude, location.longitude);
        self.geocode(&[("latlng", latlng.as_str())])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults(location.to_string()))
    }

    async fn resolve_place(&self, place_id: &str) -> Result<GeocodeResult, GeocodeError> {
        let reply: Option<GmDetailsResponse> = self
            .get("place/details", &[("place_id", place_id), ("fields", DETAILS_FIELDS)])
            .await?;

        let mut place = reply
            .and_then(|r| r.result)
            .ok_or_else(|| GeocodeError::NoResults(place_id.to_string()))?;
        // Details omit the id unless requested; keep the one we were given.
        place.place_id.get_or_insert_with(|| place_id.to_string());

        Ok(place.into())
    }
}
