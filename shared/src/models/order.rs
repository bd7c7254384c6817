//! Order Model (checkout records, read-only from the dashboard)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::from_minor_units;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(default)]
    pub name: String,
}

/// Checkout price data (minor units)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceData {
    #[serde(default)]
    pub currency: Option<String>,
    pub unit_amount: i64,
    #[serde(default)]
    pub product_data: Option<ProductData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub quantity: i64,
    pub price_data: PriceData,
}

impl LineItem {
    /// Line total in minor units
    pub fn total_minor(&self) -> i64 {
        self.quantity.saturating_mul(self.price_data.unit_amount)
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "line_items")]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Order total in major units
    pub fn total(&self) -> Decimal {
        let minor = self
            .line_items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.total_minor()));
        from_minor_units(minor)
    }
}
