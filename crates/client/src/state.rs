//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::api::ApiClient;
use crate::config::ClientConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds the configuration
/// and the pooled HTTP client every per-request [`ApiClient`] is built on.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    http: reqwest::Client,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                http: reqwest::Client::new(),
            }),
        }
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// API client whose token and cached user live in `session`.
    #[must_use]
    pub fn api(&self, session: Session) -> ApiClient<Session> {
        ApiClient::new(
            self.inner.http.clone(),
            self.inner.config.api.base_url.clone(),
            session,
        )
    }
}
