//! Status enums for POS entities.
//!
//! Wire values follow the POS API, which uses Spanish identifiers
//! (`efectivo`, `completada`, `cajero`, ...).

use serde::{Deserialize, Serialize};

/// Payment method of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Cash payment.
    #[default]
    #[serde(rename = "efectivo")]
    Cash,
    /// Card payment.
    #[serde(rename = "tarjeta")]
    Card,
    /// Bank transfer.
    #[serde(rename = "transferencia")]
    Transfer,
}

impl PaymentMethod {
    /// All payment methods, in display order.
    pub const ALL: [Self; 3] = [Self::Cash, Self::Card, Self::Transfer];

    /// Wire identifier of the payment method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "efectivo",
            Self::Card => "tarjeta",
            Self::Transfer => "transferencia",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "efectivo" => Ok(Self::Cash),
            "tarjeta" => Ok(Self::Card),
            "transferencia" => Ok(Self::Transfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Lifecycle status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// Awaiting payment confirmation.
    #[serde(rename = "pendiente")]
    Pending,
    /// Paid and closed.
    #[default]
    #[serde(rename = "completada")]
    Completed,
    /// Voided.
    #[serde(rename = "cancelada")]
    Cancelled,
}

/// Role of a POS user.
///
/// The API stores roles as free-form strings. `admin` and `cajero` select
/// dedicated dashboards; any other value is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Cashier working a till.
    Cashier,
    /// Any other role name (may be empty).
    Other(String),
}

impl Role {
    /// Wire identifier of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Cashier => "cajero",
            Self::Other(name) => name,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "cajero" => Self::Cashier,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Card).unwrap(),
            "\"tarjeta\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"transferencia\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Transfer);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("efectivo".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        let parsed: SaleStatus = serde_json::from_str("\"cancelada\"").unwrap();
        assert_eq!(parsed, SaleStatus::Cancelled);
    }

    #[test]
    fn test_role_roundtrip_preserves_unknown() {
        let role: Role = serde_json::from_str("\"supervisor\"").unwrap();
        assert_eq!(role, Role::Other("supervisor".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"supervisor\"");

        let cashier: Role = serde_json::from_str("\"cajero\"").unwrap();
        assert_eq!(cashier, Role::Cashier);
        assert_eq!(cashier.to_string(), "cajero");
    }
}
