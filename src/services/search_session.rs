//! Observable state for one restaurant search and its pagination.
//!
//! Every orchestration re-authenticates anonymously; only the search id
//! survives between calls. Failures are logged, recorded on the state and
//! returned, but never leave the result list half-written.

use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

use crate::models::{RestaurantResult, SearchCriteria, SearchPage};
use crate::services::booking_service::{BookingGateway, GatewayError};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub restaurants: Vec<RestaurantResult>,

    pub total: u64,

    pub is_loading: bool,

    pub current_page: u32,

    /// Opaque id binding `load_more` calls to the original query.
    pub search_id: String,

    /// Message of the most recent failed orchestration.
    pub last_error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            total: 0,
            is_loading: false,
            current_page: 1,
            search_id: String::new(),
            last_error: None,
        }
    }
}

impl SearchState {
    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.restaurants.len() as u64) < self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Another orchestration was running or every result is already loaded.
    Skipped,

    Loaded(usize),
}

/// Clears `is_loading` however the orchestration exits, including when its
/// future is dropped mid-flight.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SearchState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

pub struct SearchSession<G> {
    gateway: G,
    state: watch::Sender<SearchState>,
    // Held for the whole orchestration so `initialize_search` and `load_more`
    // never interleave their writes.
    orchestration: Mutex<()>,
}

impl<G: BookingGateway> SearchSession<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: watch::Sender::new(SearchState::default()),
            orchestration: Mutex::new(()),
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Starts a fresh search, replacing whatever was loaded before.
    ///
    /// Waits for an in-flight `load_more` to finish first.
    pub async fn initialize_search(&self, criteria: &SearchCriteria) -> Result<(), GatewayError> {
        let _running = self.orchestration.lock().await;

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.restaurants.clear();
            s.total = 0;
            s.current_page = 1;
            s.last_error = None;
        });
        let _loading = LoadingGuard { state: &self.state };

        info!(
            date = %criteria.date,
            time = %criteria.time,
            size = %criteria.size,
            "Starting restaurant search"
        );

        match self.run_initial_search(criteria).await {
            Ok(page) => {
                let count = page.posts.len();
                let total = page.total;
                self.state.send_modify(|s| {
                    s.restaurants = page.posts;
                    s.total = total;
                });
                info!(count, total, "Search finished");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Search failed");
                self.state.send_modify(|s| s.last_error = Some(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_initial_search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<SearchPage, GatewayError> {
        let session = self.gateway.login_anonymously().await?;
        debug!("Anonymous session opened");

        let token = self
            .gateway
            .acquire_search_token(&session.jwt_token, criteria)
            .await?;
        debug!(
            search_id = %token.search_id,
            areas = token.areas.len(),
            "Search token acquired"
        );

        let search_id = token.search_id;
        self.state.send_modify(|s| s.search_id.clone_from(&search_id));

        self.gateway
            .search_restaurants(&session.jwt_token, &search_id)
            .await
    }

    /// Fetches the next batch for the current search id and appends it.
    ///
    /// A failed call rolls the list back to what it was before the call.
    pub async fn load_more(&self) -> Result<LoadMore, GatewayError> {
        let Ok(_running) = self.orchestration.try_lock() else {
            debug!("Search in flight, not loading more");
            return Ok(LoadMore::Skipped);
        };

        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.is_loading || !s.has_more() {
                return false;
            }
            claimed = Some((s.restaurants.clone(), s.search_id.clone(), s.current_page));
            s.is_loading = true;
            s.last_error = None;
            true
        });

        let Some((snapshot, search_id, page)) = claimed else {
            debug!("No more results to load");
            return Ok(LoadMore::Skipped);
        };
        let _loading = LoadingGuard { state: &self.state };

        info!(page = page + 1, %search_id, "Loading more results");

        match self.fetch_page(&search_id).await {
            Ok(next) => {
                let added = next.posts.len();
                let mut restaurants = snapshot;
                restaurants.extend(next.posts);
                self.state.send_modify(|s| {
                    s.restaurants = restaurants;
                    s.current_page += 1;
                });
                info!(added, "Loaded more results");
                Ok(LoadMore::Loaded(added))
            }
            Err(e) => {
                error!(error = %e, "Load more failed");
                self.state.send_modify(|s| {
                    s.restaurants = snapshot;
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn fetch_page(&self, search_id: &str) -> Result<SearchPage, GatewayError> {
        let session = self.gateway.login_anonymously().await?;
        self.gateway
            .search_restaurants(&session.jwt_token, search_id)
            .await
    }

    #[must_use]
    pub fn restaurants(&self) -> Vec<RestaurantResult> {
        self.state.borrow().restaurants.clone()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.state.borrow().total
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state.borrow().has_more()
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    #[must_use]
    pub fn search_id(&self) -> String {
        self.state.borrow().search_id.clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchToken, Session};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct ScriptedGateway {
        fail_login: AtomicBool,
        fail_token: AtomicBool,
        pages: std::sync::Mutex<VecDeque<Result<SearchPage, GatewayError>>>,
        gate: Option<Arc<Notify>>,
        logins: AtomicUsize,
        tokens: AtomicUsize,
        searches: AtomicUsize,
        searched_ids: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn with_pages(pages: Vec<Result<SearchPage, GatewayError>>) -> Self {
            Self {
                pages: std::sync::Mutex::new(pages.into()),
                ..Self::default()
            }
        }

        fn calls(&self) -> (usize, usize, usize) {
            (
                self.logins.load(Ordering::SeqCst),
                self.tokens.load(Ordering::SeqCst),
                self.searches.load(Ordering::SeqCst),
            )
        }
    }

    fn remote_failure() -> GatewayError {
        GatewayError::Remote {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[async_trait::async_trait]
    impl BookingGateway for ScriptedGateway {
        async fn login_anonymously(&self) -> Result<Session, GatewayError> {
            let n = self.logins.fetch_add(1, Ordering::SeqCst);
            if self.fail_login.load(Ordering::SeqCst) {
                return Err(remote_failure());
            }
            Ok(Session {
                jwt_token: format!("jwt-{n}"),
                refresh_token: "refresh".to_string(),
            })
        }

        async fn acquire_search_token(
            &self,
            _jwt_token: &str,
            _criteria: &SearchCriteria,
        ) -> Result<SearchToken, GatewayError> {
            let n = self.tokens.fetch_add(1, Ordering::SeqCst);
            if self.fail_token.load(Ordering::SeqCst) {
                return Err(remote_failure());
            }
            Ok(SearchToken {
                search_id: format!("search-{n}"),
                areas: Vec::new(),
            })
        }

        async fn search_restaurants(
            &self,
            _jwt_token: &str,
            search_id: &str,
        ) -> Result<SearchPage, GatewayError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.searched_ids
                .lock()
                .unwrap()
                .push(search_id.to_string());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(remote_failure()))
        }
    }

    fn restaurant(slug: &str) -> RestaurantResult {
        serde_json::from_value(json!({
            "post": {"slug": slug, "venue_name": slug.to_uppercase()},
            "availability": {"areas": []}
        }))
        .unwrap()
    }

    fn page(slugs: &[&str], total: u64) -> SearchPage {
        SearchPage {
            posts: slugs.iter().map(|s| restaurant(s)).collect(),
            total,
        }
    }

    fn slugs(session: &SearchSession<ScriptedGateway>) -> Vec<String> {
        session
            .restaurants()
            .iter()
            .map(|r| r.venue_slug().to_string())
            .collect()
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria::new("2", "2024-01-01", "2000")
    }

    #[tokio::test]
    async fn test_initialize_search_populates_state() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Ok(page(&["a", "b"], 5))]));

        session.initialize_search(&criteria()).await.unwrap();

        assert_eq!(slugs(&session), vec!["a", "b"]);
        assert_eq!(session.total(), 5);
        assert!(session.has_more());
        assert!(!session.is_loading());
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.search_id(), "search-0");
        assert!(session.last_error().is_none());
        assert_eq!(session.gateway().calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_initialize_search_login_failure() {
        let gateway = ScriptedGateway::default();
        gateway.fail_login.store(true, Ordering::SeqCst);
        let session = SearchSession::new(gateway);

        let result = session.initialize_search(&criteria()).await;

        assert!(matches!(result, Err(GatewayError::Remote { status: 500, .. })));
        assert!(session.restaurants().is_empty());
        assert!(!session.is_loading());
        assert!(session.last_error().is_some());
        assert_eq!(session.gateway().calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_failed_reinitialize_clears_previous_results() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Ok(page(&["a"], 3))]));
        session.initialize_search(&criteria()).await.unwrap();

        session.gateway().fail_token.store(true, Ordering::SeqCst);
        assert!(session.initialize_search(&criteria()).await.is_err());

        assert!(session.restaurants().is_empty());
        assert!(!session.has_more());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_search_failure_keeps_restaurants_empty() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Err(remote_failure())]));

        assert!(session.initialize_search(&criteria()).await.is_err());

        assert!(session.restaurants().is_empty());
        assert_eq!(session.search_id(), "search-0");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_load_more_appends_with_same_search_id() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![
            Ok(page(&["a", "b"], 5)),
            Ok(page(&["c"], 5)),
        ]));
        session.initialize_search(&criteria()).await.unwrap();

        let outcome = session.load_more().await.unwrap();

        assert_eq!(outcome, LoadMore::Loaded(1));
        assert_eq!(slugs(&session), vec!["a", "b", "c"]);
        assert_eq!(session.current_page(), 2);
        assert_eq!(session.total(), 5);
        assert!(!session.is_loading());
        // Fresh login each time, token only once.
        assert_eq!(session.gateway().calls(), (2, 1, 2));
        assert_eq!(
            *session.gateway().searched_ids.lock().unwrap(),
            vec!["search-0", "search-0"]
        );
    }

    #[tokio::test]
    async fn test_load_more_failure_rolls_back() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![
            Ok(page(&["a", "b"], 5)),
            Err(remote_failure()),
        ]));
        session.initialize_search(&criteria()).await.unwrap();
        let before = session.snapshot();

        assert!(session.load_more().await.is_err());

        assert_eq!(slugs(&session), vec!["a", "b"]);
        assert_eq!(session.current_page(), before.current_page);
        assert!(!session.is_loading());
        assert!(session.last_error().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_load_more_login_failure_rolls_back() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Ok(page(&["a"], 2))]));
        session.initialize_search(&criteria()).await.unwrap();
        session.gateway().fail_login.store(true, Ordering::SeqCst);

        assert!(session.load_more().await.is_err());

        assert_eq!(slugs(&session), vec!["a"]);
        assert_eq!(session.gateway().calls(), (2, 1, 1));
    }

    #[tokio::test]
    async fn test_load_more_without_more_is_noop() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Ok(page(&["a", "b"], 2))]));
        session.initialize_search(&criteria()).await.unwrap();
        let before = session.snapshot();
        let calls = session.gateway().calls();

        assert_eq!(session.load_more().await.unwrap(), LoadMore::Skipped);

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.gateway().calls(), calls);
    }

    #[tokio::test]
    async fn test_load_more_before_search_is_noop() {
        let session = SearchSession::new(ScriptedGateway::default());

        assert_eq!(session.load_more().await.unwrap(), LoadMore::Skipped);

        assert_eq!(session.snapshot(), SearchState::default());
        assert_eq!(session.gateway().calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_load_more_skipped_while_search_in_flight() {
        let gate = Arc::new(Notify::new());
        let gateway = ScriptedGateway {
            gate: Some(gate.clone()),
            ..ScriptedGateway::with_pages(vec![Ok(page(&["a"], 4))])
        };
        let session = Arc::new(SearchSession::new(gateway));
        let mut states = session.subscribe();

        let running = {
            let session = session.clone();
            tokio::spawn(async move { session.initialize_search(&criteria()).await })
        };

        states.wait_for(|s| s.is_loading).await.unwrap();
        assert_eq!(session.load_more().await.unwrap(), LoadMore::Skipped);

        gate.notify_one();
        running.await.unwrap().unwrap();

        assert_eq!(slugs(&session), vec!["a"]);
        assert!(!session.is_loading());
        assert_eq!(session.gateway().calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_dropped_search_clears_loading() {
        let gateway = ScriptedGateway {
            gate: Some(Arc::new(Notify::new())),
            ..ScriptedGateway::default()
        };
        let session = SearchSession::new(gateway);

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            session.initialize_search(&criteria()),
        )
        .await;

        assert!(result.is_err());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_see_loading_transitions() {
        let session = SearchSession::new(ScriptedGateway::with_pages(vec![Ok(page(&["a"], 1))]));
        let mut states = session.subscribe();

        session.initialize_search(&criteria()).await.unwrap();

        assert!(states.has_changed().unwrap());
        let state = states.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert_eq!(state.total, 1);
        assert!(!state.has_more());
    }
}
