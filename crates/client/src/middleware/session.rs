//! Session middleware configuration.
//!
//! Sessions live in an in-process `MemoryStore`; the cookie only carries the
//! signed session id. Token, cached user, theme and page state are stored
//! server-side under the keys in [`crate::storage::keys`].

use secrecy::ExposeSecret;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{ClientConfig, ConfigError};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pos_session";

/// Session expiry time in seconds (12 hours, one long shift).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store and signed cookies.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the session secret cannot be
/// used as a signing key.
pub fn create_session_layer(
    config: &ClientConfig,
) -> Result<SessionManagerLayer<MemoryStore, tower_sessions::service::SignedCookie>, ConfigError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("POS_SESSION_SECRET".to_string(), e.to_string())
    })?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
