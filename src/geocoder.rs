use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::Location;

/// Geocoder
///
/// Resolves a free-form postal address into a `Location`. `Ok(None)` means the
/// provider answered but found nothing usable.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Location>, String>;
}

/// GeocoderState
pub type GeocoderState = Arc<dyn Geocoder>;

// --- MapQuest-compatible HTTP client ---

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    locations: Vec<GeocodeLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeLocation {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    // City
    #[serde(default)]
    admin_area5: String,
    // State
    #[serde(default)]
    admin_area3: String,
    // Country code
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeLocation {
    fn into_location(self) -> Location {
        let formatted_address = [
            self.street.as_str(),
            self.admin_area5.as_str(),
            self.admin_area3.as_str(),
            self.postal_code.as_str(),
            self.admin_area1.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

        Location {
            kind: "Point".to_string(),
            coordinates: vec![self.lat_lng.lng, self.lat_lng.lat],
            formatted_address,
            city: self.admin_area5,
            state: self.admin_area3,
            zipcode: self.postal_code,
            country: self.admin_area1,
        }
    }
}

/// Picks the first location of the first result, if any.
fn first_location(body: GeocodeResponse) -> Option<Location> {
    body.results
        .into_iter()
        .next()
        .and_then(|r| r.locations.into_iter().next())
        .map(GeocodeLocation::into_location)
}

/// HttpGeocoder
///
/// Calls a MapQuest-style `/geocoding/v1/address` endpoint with `reqwest`.
#[derive(Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGeocoder {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Location>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("geocoder returned {}", response.status()));
        }

        let body = response
            .json::<GeocodeResponse>()
            .await
            .map_err(|e| e.to_string())?;

        Ok(first_location(body))
    }
}

/// MockGeocoder
///
/// Returns a fixed location for every address, no match at all, or a simulated failure.
#[derive(Clone, Default)]
pub struct MockGeocoder {
    pub should_fail: bool,
    pub finds_nothing: bool,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every address is unknown to the provider.
    pub fn new_empty() -> Self {
        Self {
            finds_nothing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Location>, String> {
        if self.should_fail {
            return Err("Mock Geocoder Error: Simulation requested".to_string());
        }
        if self.finds_nothing {
            return Ok(None);
        }
        Ok(Some(Location {
            kind: "Point".to_string(),
            coordinates: vec![-77.4, 38.4],
            formatted_address: address.to_string(),
            city: "Stafford".to_string(),
            state: "VA".to_string(),
            zipcode: "22554".to_string(),
            country: "US".to_string(),
        }))
    }
}
