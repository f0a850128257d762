//! Per-visitor key/value storage.
//!
//! The client keeps three durable values per visitor: the API token, the
//! cached current user and the theme preference. Production storage is the
//! visitor's `tower-sessions` session; tests use [`MemoryStorage`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_sessions::Session;

use crate::models::User;

/// Storage keys.
pub mod keys {
    /// Bearer token returned by `POST /auth/login`.
    pub const TOKEN: &str = "pos_token";
    /// JSON of the authenticated user.
    pub const USER: &str = "pos_user";
    /// `light` or `dark`.
    pub const THEME: &str = "theme";
    /// Controller state for the current page visit.
    pub const PAGE: &str = "pos_page";
}

/// Errors reading or writing visitor storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw key/value operations plus typed helpers for the credential keys.
///
/// Readers treat storage failures as a missing value (the failure is
/// logged). Writers report them.
pub trait Storage: Send + Sync {
    fn get_item(
        &self,
        key: &'static str,
    ) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;

    fn set_item(
        &self,
        key: &'static str,
        value: Value,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn remove_item(&self, key: &'static str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Read and deserialize `key`.
    fn load<T>(&self, key: &'static str) -> impl Future<Output = Option<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.get_item(key).await {
                Ok(Some(value)) => match serde_json::from_value(value) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::warn!(key, error = %e, "Discarding malformed stored value");
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(key, error = %e, "Failed to read storage");
                    None
                }
            }
        }
    }

    /// Serialize and store `value` under `key`.
    fn save<T>(&self, key: &'static str, value: &T) -> impl Future<Output = Result<(), StorageError>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let value = serde_json::to_value(value)?;
            self.set_item(key, value).await
        }
    }

    fn token(&self) -> impl Future<Output = Option<String>> + Send {
        self.load(keys::TOKEN)
    }

    fn current_user(&self) -> impl Future<Output = Option<User>> + Send {
        self.load(keys::USER)
    }

    /// Persist the token and user returned by a successful login.
    fn store_credentials(
        &self,
        token: &str,
        user: &User,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move {
            self.set_item(keys::TOKEN, Value::String(token.to_string()))
                .await?;
            self.save(keys::USER, user).await
        }
    }

    /// Remove the token and cached user. The theme preference survives.
    ///
    /// Failures are logged, never returned: callers clear credentials on
    /// paths that are already failing.
    fn clear_credentials(&self) -> impl Future<Output = ()> + Send {
        async move {
            for key in [keys::TOKEN, keys::USER] {
                if let Err(e) = self.remove_item(key).await {
                    tracing::error!(key, error = %e, "Failed to clear stored credential");
                }
            }
        }
    }
}

impl Storage for Session {
    async fn get_item(&self, key: &'static str) -> Result<Option<Value>, StorageError> {
        Ok(self.get_value(key).await?)
    }

    async fn set_item(&self, key: &'static str, value: Value) -> Result<(), StorageError> {
        self.insert_value(key, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &'static str) -> Result<(), StorageError> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// In-process storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<&'static str, Value>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` currently holds a value.
    pub async fn contains(&self, key: &'static str) -> bool {
        self.items.read().await.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    async fn get_item(&self, key: &'static str) -> Result<Option<Value>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &'static str, value: Value) -> Result<(), StorageError> {
        self.items.write().await.insert(key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &'static str) -> Result<(), StorageError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            name: "Ana".to_string(),
            username: "ana".to_string(),
            email: "ana@tienda.com".to_string(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn test_store_and_read_credentials() {
        let storage = MemoryStorage::new();
        assert!(storage.token().await.is_none());

        storage.store_credentials("tok-1", &user()).await.unwrap();

        assert_eq!(storage.token().await.as_deref(), Some("tok-1"));
        assert_eq!(storage.current_user().await.unwrap().username, "ana");
    }

    #[tokio::test]
    async fn test_clear_credentials_keeps_theme() {
        let storage = MemoryStorage::new();
        storage.store_credentials("tok-1", &user()).await.unwrap();
        storage.save(keys::THEME, &"dark").await.unwrap();

        storage.clear_credentials().await;

        assert!(!storage.contains(keys::TOKEN).await);
        assert!(!storage.contains(keys::USER).await);
        assert_eq!(storage.load::<String>(keys::THEME).await.as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_malformed_value_reads_as_missing() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::TOKEN, Value::Bool(true)).await.unwrap();
        assert!(storage.token().await.is_none());
    }
}
