use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A purchasable configuration of a product (size/color etc.) with its own
/// price and stock. Stored on the product row as an ordered JSON list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub model_id: i64,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

/// Aggregation policy for the top-level display fields when variants exist:
/// price follows the first variant, stock is the sum across variants.
pub fn display_price(variants: &[Variant]) -> Option<f64> {
    variants.first().map(|v| v.price)
}

pub fn total_stock(variants: &[Variant]) -> i64 {
    variants.iter().map(|v| v.stock).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub shopee_item_id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    /// JSON-encoded ordered `Vec<Variant>`; empty list for no-model items.
    pub variants: String,
    pub has_model: bool,
    pub is_auto_bump: bool,
    pub last_bumped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn parsed_variants(&self) -> Vec<Variant> {
        serde_json::from_str(&self.variants).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub shopee_item_id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub variants: Vec<Variant>,
    pub has_model: bool,
    pub is_auto_bump: bool,
    pub last_bumped_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let variants = p.parsed_variants();
        Self {
            id: p.id,
            shopee_item_id: p.shopee_item_id,
            name: p.name,
            price: p.price,
            stock: p.stock,
            variants,
            has_model: p.has_model,
            is_auto_bump: p.is_auto_bump,
            last_bumped_at: p.last_bumped_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    /// Variant to update; omit for items without models.
    pub model_id: Option<i64>,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub model_id: Option<i64>,
    pub stock: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutoBumpRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BumpRequest {
    pub item_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants() -> Vec<Variant> {
        vec![
            Variant {
                model_id: 1,
                name: "S".to_string(),
                price: 9.9,
                stock: 3,
            },
            Variant {
                model_id: 2,
                name: "M".to_string(),
                price: 12.5,
                stock: 7,
            },
        ]
    }

    #[test]
    fn test_display_price_is_first_variant() {
        assert_eq!(display_price(&variants()), Some(9.9));
        assert_eq!(display_price(&[]), None);
    }

    #[test]
    fn test_total_stock_is_sum() {
        assert_eq!(total_stock(&variants()), 10);
        assert_eq!(total_stock(&[]), 0);
    }

    #[test]
    fn test_variants_round_trip_preserves_order() {
        let json = serde_json::to_string(&variants()).unwrap();
        let parsed: Vec<Variant> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, variants());
        assert_eq!(parsed[0].model_id, 1);
    }
}
