use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// A catalog product document. `href` is a navigation link computed by the
/// service layer, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub name: String,
    pub detail: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update input: id and timestamps are server-generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub detail: String,
    pub price: f64,
    pub quantity: i64,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name must not be empty".into()));
        }
        if self.detail.trim().is_empty() {
            return Err(ModelError::Validation("detail must not be empty".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ModelError::Validation("price must be non-negative".into()));
        }
        if self.quantity < 0 {
            return Err(ModelError::Validation("quantity must be non-negative".into()));
        }
        Ok(())
    }

    /// Materialize a new document with a generated id and fresh timestamps.
    pub fn into_product(self) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            href: None,
            name: self.name,
            detail: self.detail,
            price: self.price,
            quantity: self.quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "keyboard".into(),
            detail: "65% mechanical".into(),
            price: 59.9,
            quantity: 10,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut bad = input();
        bad.name = "  ".into();
        assert!(matches!(bad.validate(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn negative_price_and_quantity_are_rejected() {
        let mut bad = input();
        bad.price = -1.0;
        assert!(bad.validate().is_err());
        let mut bad = input();
        bad.quantity = -5;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn into_product_generates_id_and_timestamps() {
        let product = input().into_product();
        assert!(!product.id.is_empty());
        assert!(product.href.is_none());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn href_is_omitted_from_json_when_absent() {
        let product = input().into_product();
        let v = serde_json::to_value(&product).expect("serialize");
        assert!(v.get("href").is_none());
    }
}
