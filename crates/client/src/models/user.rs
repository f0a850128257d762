//! User model and login credentials.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use poscore_core::{Role, UserId};

use super::ModelError;

/// An authenticated POS user, as returned by the auth API and cached in
/// session storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserRecord")]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "rol")]
    pub role: Role,
    pub email: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: UserId::default(),
            name: String::new(),
            username: String::new(),
            role: Role::default(),
            email: String::new(),
            active: true,
        }
    }
}

impl User {
    /// Username and email are both required.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidUser`] if either is empty.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.username.is_empty() || self.email.is_empty() {
            return Err(ModelError::InvalidUser);
        }
        Ok(())
    }

    /// Strict role comparison.
    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        &self.role == role
    }
}

/// Lenient wire shape. The auth service sends `correo` for the email.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserRecord {
    id: Option<UserId>,
    nombre: Option<String>,
    usuario: Option<String>,
    rol: Option<Role>,
    #[serde(alias = "correo")]
    email: Option<String>,
    activo: Option<bool>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let defaults = Self::default();
        Self {
            id: record.id.unwrap_or(defaults.id),
            name: record.nombre.unwrap_or(defaults.name),
            username: record.usuario.unwrap_or(defaults.username),
            role: record.rol.unwrap_or(defaults.role),
            email: record.email.unwrap_or(defaults.email),
            active: record.activo.unwrap_or(defaults.active),
        }
    }
}

/// Login form credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "expose_password")]
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials, trimming the username.
    #[must_use]
    pub fn new(username: &str, password: impl Into<String>) -> Self {
        Self {
            username: username.trim().to_string(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both fields must be filled in before calling the API.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn expose_password<S: Serializer>(password: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_with_correo_alias() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "nombre": "Ana",
            "usuario": "ana",
            "rol": "cajero",
            "correo": "ana@tienda.com"
        }))
        .unwrap();

        assert_eq!(user.email, "ana@tienda.com");
        assert_eq!(user.role, Role::Cashier);
        assert!(user.active);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_username_and_email() {
        let user = User {
            username: "ana".to_string(),
            ..User::default()
        };
        assert_eq!(user.validate(), Err(ModelError::InvalidUser));
    }

    #[test]
    fn test_has_role_is_strict() {
        let user = User {
            role: Role::from("Admin"),
            ..User::default()
        };
        assert!(!user.has_role(&Role::Admin));
        assert!(user.has_role(&Role::Other("Admin".to_string())));
    }

    #[test]
    fn test_credentials_trim_and_redact() {
        let credentials = Credentials::new("  ana ", "s3cret");
        assert_eq!(credentials.username, "ana");
        assert!(credentials.is_complete());
        assert!(!format!("{credentials:?}").contains("s3cret"));

        let body = serde_json::to_value(&credentials).unwrap();
        assert_eq!(body["password"], "s3cret");

        assert!(!Credentials::new("   ", "x").is_complete());
    }
}
