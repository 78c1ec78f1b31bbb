//! Reverse geocoding.
//!
//! [`NominatimGeocoder`] queries an OpenStreetMap Nominatim-compatible
//! `/reverse` endpoint and maps its address details onto
//! [`GeocodedAddress`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use trafficeye_core::error::CoreError;
use trafficeye_core::location::{Coordinates, GeocodedAddress};

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoder error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate addresses for `coordinates`, best first. May be empty.
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<GeocodedAddress>, GeocodeError>;
}

/// | Env Var                 | Default                               |
/// |-------------------------|---------------------------------------|
/// | `GEOCODER_URL`          | `https://nominatim.openstreetmap.org` |
/// | `GEOCODER_TIMEOUT_SECS` | `10`                                  |
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Bound on a whole reverse-geocode request.
    pub timeout: Duration,
}

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = concat!("trafficeye/", env!("CARGO_PKG_VERSION"));

impl GeocoderConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        let base_url = std::env::var("GEOCODER_URL")
            .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = match std::env::var("GEOCODER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                CoreError::Validation("GEOCODER_TIMEOUT_SECS must be a valid u64".into())
            })?,
            Err(_) => DEFAULT_GEOCODER_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<AddressDetails>,
    /// Set instead of an address when nothing is found.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressDetails {
    house_number: Option<String>,
    building: Option<String>,
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Turn a non-2xx response into [`GeocodeError::ApiError`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeocodeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeocodeError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<GeocodedAddress>, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
            ])
            .send()
            .await?;

        let reply: ReverseResponse = Self::ensure_success(response).await?.json().await?;
        Ok(to_candidates(reply))
    }
}

fn to_candidates(reply: ReverseResponse) -> Vec<GeocodedAddress> {
    if let Some(error) = reply.error {
        tracing::debug!(%error, "Geocoder found no address");
        return Vec::new();
    }
    let details = reply.address.unwrap_or_default();
    vec![GeocodedAddress {
        name: reply
            .name
            .filter(|n| !n.trim().is_empty())
            .or(details.building)
            .or(details.house_number),
        street: details.road,
        district: details.suburb.or(details.neighbourhood),
        city: details.city.or(details.town).or(details.village),
        subregion: details.state_district.or(details.county),
        region: details.state,
        postal_code: details.postcode,
    }]
}
