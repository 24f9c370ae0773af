//! OpenStreetMap Nominatim adapter. Free, no key, but rate-sensitive and
//! requires an identifying User-Agent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::GeocodeError,
    http::{build_client, truncate_body},
    model::{Address, AddressComponents, GeocodeResult, Location},
};

use super::{GeocodingProvider, ProviderId};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Clone)]
pub struct NominatimProvider {
    http: Client,
    base_url: String,
}

impl NominatimProvider {
    pub fn new(user_agent: &str) -> Result<Self, GeocodeError> {
        Ok(Self { http: build_client(user_agent)?, base_url: NOMINATIM_URL.to_string() })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GeocodeError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, ?query, "Nominatim request");

        let res = self
            .http
            .get(&url)
            .query(&[("format", "jsonv2"), ("addressdetails", "1")])
            .query(query)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(GeocodeError::Http {
                provider: "nominatim",
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| GeocodeError::Schema(format!("Nominatim {endpoint}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
    display_name: String,
    address: Option<NmAddress>,
}

#[derive(Debug, Deserialize)]
struct NmAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
}

/// Reverse answers with either a place or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NmReverse {
    Place(NmPlace),
    Error { error: String },
}

impl TryFrom<NmPlace> for GeocodeResult {
    type Error = GeocodeError;

    fn try_from(place: NmPlace) -> Result<Self, Self::Error> {
        let parse = |field: &str, value: &str| {
            value.parse::<f64>().map_err(|_| {
                GeocodeError::Schema(format!("Nominatim returned non-numeric {field} '{value}'"))
            })
        };

        let components = place
            .address
            .map(|a| AddressComponents {
                street_number: a.house_number,
                route: a.road,
                city: a.city.or(a.town).or(a.village).or(a.hamlet),
                county: a.county,
                state: a.state,
                country: a.country,
                postal_code: a.postcode,
            })
            .unwrap_or_default();

        Ok(GeocodeResult {
            latitude: parse("lat", &place.lat)?,
            longitude: parse("lon", &place.lon)?,
            formatted_address: place.display_name,
            components,
            // Coordinates are always present, nothing to resolve later.
            place_id: None,
        })
    }
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Nominatim
    }

    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let places: Vec<NmPlace> =
            self.get("search", &[("q", query), ("limit", SEARCH_LIMIT)]).await?;
        places.into_iter().map(GeocodeResult::try_from).collect()
    }

    async fn geocode_address(&self, address: &Address) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let mut params = vec![
            ("city", address.city.trim()),
            ("state", address.state.trim()),
            ("limit", SEARCH_LIMIT),
        ];
        let optional = [
            ("street", &address.street),
            ("country", &address.country),
            ("postalcode", &address.postal_code),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                params.push((key, v));
            }
        }

        let places: Vec<NmPlace> = self.get("search", &params).await?;
        places.into_iter().map(GeocodeResult::try_from).collect()
    }

    async fn reverse(&self, location: Location) -> Result<GeocodeResult, GeocodeError> {
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();
        let reply: NmReverse =
            self.get("reverse", &[("lat", lat.as_str()), ("lon", lon.as_str())]).await?;

        match reply {
            NmReverse::Place(place) => place.try_into(),
            NmReverse::Error { error } => {
                tracing::debug!("Nominatim reverse error: {error}");
                Err(GeocodeError::NoResults(location.to_string()))
            }
        }
    }
}
