//! Location Resolution: position fix, then reverse geocode.
//!
//! A position fix is required. Once it succeeds the call always yields a
//! usable address, falling back to `"lat, lon"` when geocoding fails.

use std::sync::Arc;
use std::time::Duration;

use trafficeye_core::error::CoreError;
use trafficeye_core::location::ResolvedLocation;
use trafficeye_core::notice::{Notice, NoticeSink};

use crate::device::{Permission, PermissionProvider, PositionProvider};
use crate::geocoder::Geocoder;

/// | Env Var               | Default |
/// |-----------------------|---------|
/// | `LOCATION_TIMEOUT_MS` | `5000`  |
/// | `GEOCODE_TIMEOUT_MS`  | `10000` |
#[derive(Debug, Clone)]
pub struct LocationConfig {
    /// Bounded wait for the position fix.
    pub timeout: Duration,
    /// Bounded wait for reverse geocoding; expiry falls back to coordinates.
    pub geocode_timeout: Duration,
}

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_GEOCODE_TIMEOUT_MS: u64 = 10_000;

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_LOCATION_TIMEOUT_MS),
            geocode_timeout: Duration::from_millis(DEFAULT_GEOCODE_TIMEOUT_MS),
        }
    }
}

impl LocationConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            timeout: millis_from_env("LOCATION_TIMEOUT_MS", DEFAULT_LOCATION_TIMEOUT_MS)?,
            geocode_timeout: millis_from_env("GEOCODE_TIMEOUT_MS", DEFAULT_GEOCODE_TIMEOUT_MS)?,
        })
    }
}

fn millis_from_env(var: &str, default: u64) -> Result<Duration, CoreError> {
    let ms: u64 = match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CoreError::Validation(format!("{var} must be a valid u64")))?,
        Err(_) => default,
    };
    Ok(Duration::from_millis(ms))
}

pub struct LocationResolver {
    permissions: Arc<dyn PermissionProvider>,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn Geocoder>,
    notices: Arc<dyn NoticeSink>,
    config: LocationConfig,
}

impl LocationResolver {
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        position: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn Geocoder>,
        notices: Arc<dyn NoticeSink>,
        config: LocationConfig,
    ) -> Self {
        Self {
            permissions,
            position,
            geocoder,
            notices,
            config,
        }
    }

    pub async fn resolve(&self) -> Option<ResolvedLocation> {
        let status = self.permissions.request(Permission::Location).await;
        if !status.is_granted() {
            self.notices.notify(Notice::permission_required(
                "Please grant location access to detect your location.",
            ));
            return None;
        }

        let coordinates =
            match tokio::time::timeout(self.config.timeout, self.position.current_position()).await
            {
                Ok(Ok(coordinates)) => coordinates,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Position fix failed");
                    self.notices
                        .notify(Notice::error("Failed to detect your location."));
                    return None;
                }
                Err(_) => {
                    tracing::error!(timeout_ms = self.config.timeout.as_millis() as u64, "Position fix timed out");
                    self.notices
                        .notify(Notice::error("Failed to detect your location."));
                    return None;
                }
            };

        let geocoded =
            tokio::time::timeout(self.config.geocode_timeout, self.geocoder.reverse_geocode(coordinates))
                .await;
        match geocoded {
            Ok(Ok(candidates)) => Some(ResolvedLocation::from_candidates(coordinates, &candidates)),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Reverse geocoding failed, using coordinates");
                Some(ResolvedLocation::fallback(coordinates))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.geocode_timeout.as_millis() as u64,
                    "Reverse geocoding timed out, using coordinates"
                );
                Some(ResolvedLocation::fallback(coordinates))
            }
        }
    }
}
