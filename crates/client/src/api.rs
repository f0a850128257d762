//! HTTP client for the POS JSON API.
//!
//! `ApiClient` is the only component that talks to the network. It attaches
//! the stored bearer token, turns `401` into [`ApiError::SessionExpired`]
//! (clearing the stored credentials first), and maps every other non-2xx
//! response to [`ApiError::Status`] carrying the server's message.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::storage::{Storage, StorageError};

/// Errors from the POS API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered `401`. Stored credentials have been cleared.
    #[error("Sesion expirada")]
    SessionExpired,

    /// Any other non-success status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Transport failure (connection refused, DNS, body read).
    #[error("Error de conexion: {0}")]
    Http(#[from] reqwest::Error),

    /// The body was not the JSON we expected.
    #[error("Respuesta invalida: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Error de almacenamiento: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Client for the POS API, bound to one visitor's storage.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: String,
    storage: S,
}

impl<S: Storage> ApiClient<S> {
    /// Create a client. `base_url` must not end with `/`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, storage: S) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            storage,
        }
    }

    /// Storage this client reads the token from.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    /// `POST endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    /// `POST endpoint` without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::POST, endpoint, None).await
    }

    /// `PUT endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    /// `PATCH endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, endpoint, Some(body)).await
    }

    /// `DELETE endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Store a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the token cannot be written.
    pub async fn set_token(&self, token: &str) -> Result<(), ApiError> {
        self.storage
            .set_item(crate::storage::keys::TOKEN, Value::String(token.to_string()))
            .await?;
        Ok(())
    }

    /// Forget the token and cached user.
    pub async fn clear_auth(&self) {
        self.storage.clear_credentials().await;
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty success body decodes as `null`, so `T = Value` or
    /// `T = Option<_>` accept `204 No Content`.
    #[instrument(skip(self, body))]
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.storage.token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::error!(error = %e, "API request failed");
        })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("API rejected credentials, clearing session");
            self.clear_auth().await;
            return Err(ApiError::SessionExpired);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            tracing::warn!(status = %status, message = %message, "API returned error status");
            return Err(ApiError::Status { status, message });
        }

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
            })?
        };

        Ok(serde_json::from_value(value)?)
    }
}

/// Pick a human-readable message out of an error body.
///
/// Looks at `message`, then `detail` (the shape FastAPI-style services use),
/// and falls back to `Error <status>`.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail"]
                .iter()
                .find_map(|field| value.get(field).and_then(Value::as_str).map(String::from))
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Error {}", status.as_u16()))
}
