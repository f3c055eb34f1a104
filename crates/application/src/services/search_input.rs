//! Debounced place search
//!
//! Headless input controller: keystrokes reset a timer, only the last
//! pending timer issues a search, and results that arrive for a query the
//! user has since changed are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::{PlaceSuggestion, SelectedPlace};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{GeocodingPort, SearchRequest};

/// Search input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shorter queries never reach the geocoder
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_min_query_chars() -> usize {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

/// Snapshot reported to the hosting view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Current input value
    pub query: String,
    /// Suggestions for `query`
    pub suggestions: Vec<PlaceSuggestion>,
    /// A search for `query` is pending or in flight
    pub loading: bool,
    /// Confirmed place, if any
    pub selected: Option<SelectedPlace>,
}

struct Shared {
    generation: AtomicU64,
    state: watch::Sender<SearchState>,
    pending: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

/// Debounced search box controller
pub struct DebouncedSearch {
    geocoder: Arc<dyn GeocodingPort>,
    request: SearchRequest,
    config: SearchConfig,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for DebouncedSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSearch")
            .field("request", &self.request)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DebouncedSearch {
    /// Create a search controller
    pub fn new(geocoder: Arc<dyn GeocodingPort>, request: SearchRequest, config: SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            geocoder,
            request,
            config,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                state,
                pending: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Current state
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Invalidate everything issued so far and abort the pending timer
    fn next_generation(&self) -> u64 {
        if let Some(task) = self.shared.pending.lock().take() {
            task.abort();
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a keystroke
    ///
    /// Must be called from within a Tokio runtime; the search itself runs
    /// on a spawned task.
    #[instrument(skip(self))]
    pub fn input(&self, text: &str) {
        let generation = self.next_generation();
        let query = text.trim().to_string();
        let searchable = query.chars().count() >= self.config.min_query_chars;

        self.shared.state.send_modify(|state| {
            state.query = text.to_string();
            state.selected = None;
            state.loading = searchable;
            if !searchable {
                state.suggestions.clear();
            }
        });

        if !searchable {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, search skipped");
            self.shared.state.send_modify(|state| state.loading = false);
            return;
        };

        let shared = Arc::clone(&self.shared);
        let geocoder = Arc::clone(&self.geocoder);
        let request = self.request.clone();
        let debounce = Duration::from_millis(self.config.debounce_ms);
        let issued_for = text.to_string();

        let task = handle.spawn(async move {
            tokio::time::sleep(debounce).await;
            if shared.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!(query = %query, "Debounce elapsed, searching");
            let suggestions = geocoder.search(&query, &request).await;

            shared.state.send_if_modified(|state| {
                if shared.generation.load(Ordering::SeqCst) != generation
                    || state.query != issued_for
                {
                    debug!(query = %query, current = %state.query, "Discarding stale suggestions");
                    return false;
                }
                state.suggestions = suggestions;
                state.loading = false;
                true
            });
        });
        *self.shared.pending.lock() = Some(task);
    }

    /// Confirm a suggestion
    ///
    /// Pending searches are cancelled and the suggestion list is discarded.
    #[instrument(skip(self, suggestion), fields(id = %suggestion.id))]
    pub async fn select(
        &self,
        suggestion: &PlaceSuggestion,
    ) -> Result<SelectedPlace, ApplicationError> {
        self.next_generation();
        let place = self.geocoder.select(suggestion).await?;
        self.seed(&place);
        Ok(place)
    }

    /// Show an existing place (device position, shortcut) without searching
    pub fn seed(&self, place: &SelectedPlace) {
        self.next_generation();
        self.shared.state.send_modify(|state| {
            state.query.clone_from(&place.label);
            state.suggestions.clear();
            state.loading = false;
            state.selected = Some(place.clone());
        });
    }

    /// Reset the input
    pub fn clear(&self) {
        self.next_generation();
        self.shared.state.send_replace(SearchState::default());
    }
}
