//! Point-in-time snapshots of entities owned by the identity and catalog services.
//!
//! These mirror the downstream wire format (camelCase JSON). The orders service
//! never holds an authoritative copy; values are fetched per request and embedded
//! in responses.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Field value used by every placeholder substituted for unreachable dependencies.
pub const UNAVAILABLE: &str = "Temporarily Unavailable";

/// A user record from the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub email: Option<String>,
    pub person_name: Option<String>,
    pub gender: Option<String>,
}

impl User {
    /// Degraded stand-in returned when the identity service cannot be reached.
    ///
    /// Carries the nil id, which is never assigned to a real user.
    pub fn placeholder() -> Self {
        Self::placeholder_for(UserId::nil())
    }

    /// Degraded stand-in keyed by a requested id, used for batch lookups so
    /// each order can still find its entry.
    pub fn placeholder_for(user_id: UserId) -> Self {
        Self {
            user_id,
            email: Some(UNAVAILABLE.to_string()),
            person_name: Some(UNAVAILABLE.to_string()),
            gender: Some(UNAVAILABLE.to_string()),
        }
    }

    /// Returns true if this record is a degraded stand-in rather than real data.
    pub fn is_placeholder(&self) -> bool {
        self.email.as_deref() == Some(UNAVAILABLE) && self.person_name.as_deref() == Some(UNAVAILABLE)
    }
}

/// A product record from the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub quantity_in_stock: i32,
}

impl Product {
    /// Degraded stand-in for a requested product when the catalog is unavailable.
    pub fn placeholder(product_id: ProductId) -> Self {
        Self {
            product_id,
            product_name: Some(UNAVAILABLE.to_string()),
            category: Some(UNAVAILABLE.to_string()),
            unit_price: 0.0,
            quantity_in_stock: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_from_identity_wire_format() {
        let id = UserId::new();
        let json = serde_json::json!({
            "userID": id,
            "email": "ada@example.com",
            "personName": "Ada",
            "gender": "Female"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.person_name.as_deref(), Some("Ada"));
        assert!(!user.is_placeholder());
    }

    #[test]
    fn product_decodes_from_catalog_wire_format() {
        let id = ProductId::new();
        let json = serde_json::json!({
            "productID": id,
            "productName": "Widget",
            "category": "Tools",
            "unitPrice": 12.5,
            "quantityInStock": 40
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.product_id, id);
        assert_eq!(product.quantity_in_stock, 40);
    }

    #[test]
    fn placeholders_are_recognisable() {
        let user = User::placeholder();
        assert!(user.user_id.is_nil());
        assert!(user.is_placeholder());

        let id = UserId::new();
        let keyed = User::placeholder_for(id);
        assert_eq!(keyed.user_id, id);
        assert!(keyed.is_placeholder());

        let product_id = ProductId::new();
        let product = Product::placeholder(product_id);
        assert_eq!(product.product_id, product_id);
        assert_eq!(product.product_name.as_deref(), Some(UNAVAILABLE));
    }
}
