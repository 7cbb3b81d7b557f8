use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{GeoPoint, ResolvedArea};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use crate::services::reference::ReferenceIndex;

/// Errors that can occur while reverse geocoding
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error: {0}")]
    ApiError(String),
}

/// Turns user coordinates into reference province/district ids
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolve the area containing `point`; an empty area means no match
    async fn resolve(&self, point: GeoPoint) -> Result<ResolvedArea, GeocodeError>;
}

/// Resolver used when reverse geocoding is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGeoResolver;

#[async_trait]
impl GeoResolver for NoopGeoResolver {
    async fn resolve(&self, _point: GeoPoint) -> Result<ResolvedArea, GeocodeError> {
        Ok(ResolvedArea::default())
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    province: Option<String>,
    state: Option<String>,
    city: Option<String>,
    town: Option<String>,
    county: Option<String>,
    city_district: Option<String>,
    suburb: Option<String>,
    district: Option<String>,
}

impl ReverseAddress {
    fn province_names(&self) -> Vec<&str> {
        [&self.province, &self.state, &self.city]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .collect()
    }

    fn district_names(&self) -> Vec<&str> {
        [
            &self.town,
            &self.county,
            &self.city_district,
            &self.district,
            &self.suburb,
        ]
        .into_iter()
        .filter_map(|n| n.as_deref())
        .collect()
    }
}

/// Reverse geocoder speaking the Nominatim `/reverse` API
///
/// Place names from the response are matched against the local
/// [`ReferenceIndex`]. Results are cached per rounded coordinate when a
/// cache is attached.
pub struct NominatimGeoResolver {
    base_url: String,
    user_agent: String,
    client: Client,
    reference: Arc<ReferenceIndex>,
    cache: Option<Arc<CacheManager>>,
}

impl NominatimGeoResolver {
    pub fn new(
        base_url: String,
        user_agent: String,
        timeout: Duration,
        reference: Arc<ReferenceIndex>,
        cache: Option<Arc<CacheManager>>,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            user_agent,
            client,
            reference,
            cache,
        })
    }

    async fn reverse(&self, point: GeoPoint) -> Result<ResolvedArea, GeocodeError> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url.trim_end_matches('/'),
            point.lat(),
            point.lon()
        );

        tracing::debug!("Reverse geocoding: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .header("Accept-Language", "tr")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Reverse lookup failed: {}",
                response.status()
            )));
        }

        let body: ReverseResponse = response.json().await?;
        let address = body.address.unwrap_or_default();
        let districts = address.district_names();

        let area = address
            .province_names()
            .into_iter()
            .map(|province| self.reference.lookup(Some(province), districts.iter().copied()))
            .find(|area| !area.is_empty())
            .unwrap_or_default();

        Ok(area)
    }
}

#[async_trait]
impl GeoResolver for NominatimGeoResolver {
    async fn resolve(&self, point: GeoPoint) -> Result<ResolvedArea, GeocodeError> {
        let key = CacheKey::geo_area(point.lat(), point.lon());

        if let Some(cache) = &self.cache {
            match cache.get::<ResolvedArea>(&key).await {
                Ok(area) => return Ok(area),
                Err(CacheError::CacheMiss(_)) => {}
                Err(e) => tracing::warn!("Geocode cache read failed: {}", e),
            }
        }

        let area = self.reverse(point).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &area).await {
                tracing::warn!("Geocode cache write failed: {}", e);
            }
        }

        Ok(area)
    }
}
