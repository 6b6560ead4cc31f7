//! Verse search: the backend seam, result decoding, filter state, and the
//! debounced query coordinator.

pub mod coordinator;
mod filters;
mod result;

pub use coordinator::{MIN_QUERY_CHARS, Phase, QueryCoordinator, SearchState};
pub use filters::FilterSet;
pub use result::SearchResult;

use std::collections::BTreeSet;
use std::future::Future;

use futures::future::join_all;

use crate::prism::types::SearchRequest;
use crate::prism::{PrismClient, PrismError};
use crate::scripture::Translation;

/// Verse search over a set of translations.
/// Implemented by `PrismClient` for production; mock implementations used in tests.
pub trait VerseSearch: Send + Sync + 'static {
    fn search_verses(
        &self,
        query: &str,
        translations: &BTreeSet<Translation>,
        top_k: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, PrismError>> + Send;
}

impl VerseSearch for PrismClient {
    /// One request per translation domain, issued concurrently. Blocks are
    /// concatenated in catalog order and each keeps Prism's ranking.
    /// An empty selection makes no request.
    async fn search_verses(
        &self,
        query: &str,
        translations: &BTreeSet<Translation>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, PrismError> {
        let domains: Vec<(Translation, String)> =
            translations.iter().map(|t| (*t, t.domain())).collect();

        let requests = domains.iter().map(|(translation, domain)| async move {
            let request = SearchRequest {
                query,
                domain: Some(domain.as_str()),
                top_k,
                similarity_threshold: None,
            };
            self.search(&request)
                .await
                .map(|hits| (*translation, hits))
        });

        let mut results = Vec::new();
        for outcome in join_all(requests).await {
            let (translation, hits) = outcome?;
            results.extend(
                hits.into_iter()
                    .map(|hit| SearchResult::from_hit(hit, translation)),
            );
        }
        Ok(results)
    }
}

/// Whether `query` is long enough to be searched.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}
