//! Customer records.
//!
//! A customer is created or updated only by explicit user action. Until the
//! store assigns an id, the customer is identified by email.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// A customer account as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub shipping: Shipping,
}

impl Customer {
    /// "First Last", falling back to the email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Billing address and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Billing {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipping {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

/// Request body for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
}

/// Request body for updating a customer. Omitted fields are left unchanged
/// on the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_from_wire() {
        let customer: Customer = serde_json::from_str(
            r#"{"id": 25, "email": "john.doe@example.com", "first_name": "John",
                "last_name": "Doe", "role": "customer", "username": "john.doe",
                "billing": {"first_name": "John", "city": "San Francisco",
                            "email": "john.doe@example.com", "phone": "(555) 555-5555"},
                "shipping": {"city": "San Francisco"}, "is_paying_customer": false}"#,
        )
        .unwrap();
        assert_eq!(customer.id, CustomerId::new(25));
        assert_eq!(customer.billing.city, "San Francisco");
        assert_eq!(customer.billing.address_1, "");
        assert_eq!(customer.display_name(), "John Doe");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let customer: Customer =
            serde_json::from_str(r#"{"id": 1, "email": "anon@example.com"}"#).unwrap();
        assert_eq!(customer.display_name(), "anon@example.com");
    }

    #[test]
    fn test_new_customer_omits_empty_fields() {
        let body = NewCustomer {
            email: "jane@example.com".to_string(),
            ..NewCustomer::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"email": "jane@example.com"}));
    }

    #[test]
    fn test_patch_only_sends_present_fields() {
        let patch = CustomerPatch {
            first_name: Some("Jane".to_string()),
            ..CustomerPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"first_name": "Jane"}));
    }
}
