//! Debounced verse-search coordination.
//!
//! Typed input schedules a search after a quiet period. Every dispatched
//! search takes a fresh request token, and only the holder of the latest
//! token may write results, errors, or clear the in-progress flag. Earlier
//! responses that arrive late are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{FilterSet, SearchResult, VerseSearch, is_searchable};
use crate::deeplink::DeepLink;
use crate::prism::PrismError;
use crate::scripture::Translation;

/// Queries shorter than this (after trimming) are not searched.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Fetching,
}

/// Observable search state, published on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Query the current `results` belong to.
    pub query: String,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
    pub in_progress: bool,
    pub debouncing: bool,
}

impl SearchState {
    pub fn phase(&self) -> Phase {
        if self.in_progress {
            Phase::Fetching
        } else if self.debouncing {
            Phase::Debouncing
        } else {
            Phase::Idle
        }
    }
}

struct Input {
    query: String,
    filters: FilterSet,
    /// Bumped whenever the pending timer is superseded.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Inner<S> {
    backend: S,
    debounce: Duration,
    request_timeout: Duration,
    state: watch::Sender<SearchState>,
    input: Mutex<Input>,
    latest_request: AtomicU64,
}

pub struct QueryCoordinator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for QueryCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: VerseSearch> QueryCoordinator<S> {
    pub fn new(backend: S, filters: FilterSet, debounce: Duration, request_timeout: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                debounce,
                request_timeout,
                state,
                input: Mutex::new(Input {
                    query: String::new(),
                    filters,
                    generation: 0,
                    timer: None,
                }),
                latest_request: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn query(&self) -> String {
        self.inner.lock_input().query.clone()
    }

    pub fn filters(&self) -> FilterSet {
        self.inner.lock_input().filters.clone()
    }

    /// Replace the query text and restart the quiet period.
    ///
    /// A query below [`MIN_QUERY_CHARS`] clears results at once, and any
    /// response still in flight is ignored when it arrives.
    pub fn set_query(&self, text: impl Into<String>) {
        let mut input = self.inner.lock_input();
        input.query = text.into();
        self.schedule(&mut input);
    }

    pub fn toggle_translation(&self, translation: Translation) -> bool {
        let mut input = self.inner.lock_input();
        let selected = input.filters.toggle(translation);
        debug!(%translation, selected, "translation toggled");
        if is_searchable(&input.query) {
            self.schedule(&mut input);
        }
        selected
    }

    pub fn set_limit(&self, limit: usize) {
        let mut input = self.inner.lock_input();
        input.filters.set_limit(limit);
        if is_searchable(&input.query) {
            self.schedule(&mut input);
        }
    }

    /// Seed query and translations from a deep link without scheduling a
    /// search. Call [`submit`](Self::submit) to run it.
    pub fn apply_deep_link(&self, link: &DeepLink) {
        let mut input = self.inner.lock_input();
        if let Some(query) = &link.query {
            input.query = query.clone();
        }
        if !link.translations.is_empty() {
            input.filters.translations = link.translations.iter().copied().collect();
        }
    }

    /// Search the current query now, skipping the quiet period.
    pub async fn submit(&self) {
        let (query, filters) = {
            let mut input = self.inner.lock_input();
            cancel_timer(&mut input);
            (input.query.clone(), input.filters.clone())
        };
        self.inner.search(&query, &filters).await;
    }

    /// Drop any pending timer so no search fires after teardown.
    pub fn shutdown(&self) {
        let mut input = self.inner.lock_input();
        cancel_timer(&mut input);
        self.inner.stop_debouncing();
    }

    fn schedule(&self, input: &mut Input) {
        cancel_timer(input);
        if !is_searchable(&input.query) {
            self.inner.clear();
            return;
        }

        self.inner
            .state
            .send_if_modified(|s| !std::mem::replace(&mut s.debouncing, true));

        let generation = input.generation;
        let debounce = self.inner.debounce;
        let inner: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        input.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Gone once every coordinator handle has been dropped.
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let Some((query, filters)) = inner.take_due(generation) else {
                return;
            };
            inner.search(&query, &filters).await;
        }));
    }
}

fn cancel_timer(input: &mut Input) {
    input.generation += 1;
    if let Some(timer) = input.timer.take() {
        timer.abort();
    }
}

impl<S: VerseSearch> Inner<S> {
    fn lock_input(&self) -> MutexGuard<'_, Input> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the query for a timer that just fired, unless a newer input
    /// superseded it while it slept. `debouncing` stays set until the
    /// search publishes `in_progress` in the same update.
    fn take_due(&self, generation: u64) -> Option<(String, FilterSet)> {
        let mut input = self.lock_input();
        if input.generation != generation {
            return None;
        }
        input.timer = None;
        Some((input.query.clone(), input.filters.clone()))
    }

    fn stop_debouncing(&self) {
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.debouncing, false));
    }

    fn clear(&self) {
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.query.clear();
            s.results.clear();
            s.error = None;
            s.in_progress = false;
            s.debouncing = false;
        });
    }

    async fn search(&self, query: &str, filters: &FilterSet) {
        if !is_searchable(query) {
            debug!("query too short, clearing results");
            self.clear();
            return;
        }

        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight {
            state: &self.state,
            latest_request: &self.latest_request,
            token,
        };
        self.state.send_modify(|s| {
            s.debouncing = false;
            s.in_progress = true;
            s.error = None;
        });

        info!(
            query,
            translations = filters.translations.len(),
            limit = filters.limit,
            token,
            "dispatching search"
        );

        let request = self
            .backend
            .search_verses(query, &filters.translations, filters.limit);
        let outcome = tokio::time::timeout(self.request_timeout, request)
            .await
            .unwrap_or(Err(PrismError::Timeout(self.request_timeout)));

        self.state.send_if_modified(|s| {
            if self.latest_request.load(Ordering::SeqCst) != token {
                debug!(token, "discarding superseded response");
                return false;
            }
            match outcome {
                Ok(results) => {
                    info!(results = results.len(), "search complete");
                    s.query = query.to_string();
                    s.results = results;
                }
                Err(e) => {
                    warn!(error = %e, "search failed");
                    s.error = Some(e.to_string());
                }
            }
            s.in_progress = false;
            true
        });
    }
}

impl<S> Drop for Inner<S> {
    fn drop(&mut self) {
        let input = self.input.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = input.timer.take() {
            timer.abort();
        }
    }
}

/// Clears the in-progress flag if the owning search is abandoned before it
/// completes, as long as no newer search has started.
struct InFlight<'a> {
    state: &'a watch::Sender<SearchState>,
    latest_request: &'a AtomicU64,
    token: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.latest_request.load(Ordering::SeqCst) == self.token {
            self.state
                .send_if_modified(|s| std::mem::replace(&mut s.in_progress, false));
        }
    }
}
