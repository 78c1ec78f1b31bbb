//! Coordinates and human-readable address formatting.

use serde::{Deserialize, Serialize};

/// Decimal places used when an address falls back to raw coordinates.
pub const COORDINATE_PRECISION: usize = 6;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `"lat, lon"` with both components fixed to six decimals.
    pub fn to_fixed_string(&self) -> String {
        format!(
            "{:.prec$}, {:.prec$}",
            self.latitude,
            self.longitude,
            prec = COORDINATE_PRECISION
        )
    }
}

/// One reverse-geocoding candidate, as a device geocoder reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// Building name or number.
    pub name: Option<String>,
    pub street: Option<String>,
    /// Neighbourhood / sub-locality.
    pub district: Option<String>,
    pub city: Option<String>,
    /// Sub-district.
    pub subregion: Option<String>,
    /// State or province.
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

impl GeocodedAddress {
    /// Components in display priority order.
    fn components(&self) -> [Option<&str>; 7] {
        [
            self.name.as_deref(),
            self.street.as_deref(),
            self.district.as_deref(),
            self.city.as_deref(),
            self.subregion.as_deref(),
            self.region.as_deref(),
            self.postal_code.as_deref(),
        ]
    }

    /// Comma-joined address, skipping empty components and repeats.
    ///
    /// Returns `None` when every component is empty.
    pub fn format(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        for part in self.components().into_iter().flatten() {
            let part = part.trim();
            if part.is_empty() || parts.contains(&part) {
                continue;
            }
            parts.push(part);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Output of a successful location resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub address: String,
    /// `true` when the address is the coordinate fallback.
    pub is_fallback: bool,
}

impl ResolvedLocation {
    /// Build from the first usable geocoder candidate, or fall back to
    /// the fixed-precision coordinate string.
    pub fn from_candidates(coordinates: Coordinates, candidates: &[GeocodedAddress]) -> Self {
        match candidates.first().and_then(GeocodedAddress::format) {
            Some(address) => Self {
                coordinates,
                address,
                is_fallback: false,
            },
            None => Self::fallback(coordinates),
        }
    }

    pub fn fallback(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            address: coordinates.to_fixed_string(),
            is_fallback: true,
        }
    }
}
