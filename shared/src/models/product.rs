//! Product Model

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Property;
use crate::util::to_minor_units;

/// Parent reference inside a category snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(alias = "_id")]
    pub id: String,
}

/// Category as it was when the product was last saved (denormalized, may be stale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in major currency units (e.g. 19.99 = $19.99)
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<CategorySnapshot>,
    /// Property name -> selected value. Free-form: may hold names that no longer apply.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Current payment-platform price
    #[serde(default)]
    pub stripe_price_id: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl Product {
    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.id.as_str())
    }

    pub fn parent_category_id(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.parent.as_ref())
            .map(|p| p.id.as_str())
    }

    /// Price in minor units (cents)
    pub fn unit_amount(&self) -> Option<i64> {
        to_minor_units(self.price)
    }
}

/// Product record on the payment platform (id = local product id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// Price record on the payment platform (minor units)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPrice {
    pub id: String,
    #[serde(default)]
    pub unit_amount: Option<i64>,
    #[serde(default)]
    pub currency: String,
}
