//! Biblical place listing with a cached unfiltered view.

mod place;

pub use place::{ConfidenceLevel, Place, PlaceType};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{ResponseCache, fingerprint};
use crate::prism::types::ListParams;
use crate::prism::{PrismClient, PrismError};

pub const GEOGRAPHY_DOMAIN: &str = "geography";
pub const PLACES_TTL: Duration = Duration::from_secs(10 * 60);
const PLACE_LIMIT: usize = 1000;

/// Place type and confidence filter. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceFilter {
    pub place_type: Option<PlaceType>,
    pub confidence: Option<ConfidenceLevel>,
}

impl PlaceFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.place_type.is_none() && self.confidence.is_none()
    }

    pub fn matches(&self, place: &Place) -> bool {
        self.place_type.is_none_or(|t| place.place_type == t)
            && self.confidence.is_none_or(|c| place.confidence_level() == c)
    }
}

/// Source of place records.
/// Implemented by `PrismClient` for production; mock implementations used in tests.
pub trait PlaceSource: Send + Sync + 'static {
    fn fetch_places(
        &self,
        filter: &PlaceFilter,
    ) -> impl Future<Output = Result<Vec<Place>, PrismError>> + Send;
}

impl PlaceSource for PrismClient {
    async fn fetch_places(&self, filter: &PlaceFilter) -> Result<Vec<Place>, PrismError> {
        let mut filters = Vec::new();
        if let Some(place_type) = filter.place_type {
            filters.push(("place_type", place_type.as_str().to_string()));
        }
        if let Some(confidence) = filter.confidence {
            filters.push(("confidence", confidence.as_str().to_string()));
        }
        let params = ListParams {
            domain: Some(GEOGRAPHY_DOMAIN),
            limit: Some(PLACE_LIMIT),
            offset: None,
            filters,
        };
        let list = self.list_documents(&params).await?;
        Ok(list.documents.iter().map(Place::from_document).collect())
    }
}

pub struct GeographyService<P> {
    source: P,
    cache: ResponseCache<Arc<Vec<Place>>>,
}

impl<P: PlaceSource> GeographyService<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            cache: ResponseCache::new(PLACES_TTL),
        }
    }

    /// List places matching `filter`.
    ///
    /// The unfiltered listing is served from cache while fresh. Any filtered
    /// request goes to the source every time and never touches the cache;
    /// the filter is also applied locally in case the server ignored it.
    pub async fn places(&self, filter: &PlaceFilter) -> Result<Arc<Vec<Place>>, PrismError> {
        if filter.is_unfiltered() {
            let key = fingerprint(GEOGRAPHY_DOMAIN, ["places", "all"]);
            if let Some(places) = self.cache.get(&key) {
                debug!(count = places.len(), "places served from cache");
                return Ok(places);
            }
            let places = Arc::new(self.source.fetch_places(filter).await?);
            info!(count = places.len(), "places loaded");
            self.cache.put(key, Arc::clone(&places));
            return Ok(places);
        }

        let places: Vec<Place> = self
            .source
            .fetch_places(filter)
            .await?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        debug!(
            place_type = ?filter.place_type,
            confidence = ?filter.confidence,
            count = places.len(),
            "filtered places fetched"
        );
        Ok(Arc::new(places))
    }
}
