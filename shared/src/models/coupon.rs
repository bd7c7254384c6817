//! Coupon Models
//!
//! Two sides of the same coupon:
//! - [`RawCouponSpec`] / [`CouponSpec`]: locally authored desired state
//! - [`ExternalCoupon`] / [`PromotionCode`]: the payment platform's records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::to_minor_units;

/// Currency used for amount-based discounts
pub const COUPON_CURRENCY: &str = "usd";

/// Coupon scope selector as stored by the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyToKind {
    #[default]
    All,
    Product,
    Category,
}

/// Coupon as edited in the dashboard (loose wire form, not yet validated)
///
/// Unknown fields written by the editor are kept in `extra` so the
/// specification round-trips verbatim through the settings store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCouponSpec {
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_off: Option<f64>,
    /// Major currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_off: Option<Decimal>,
    #[serde(default)]
    pub apply_to: ApplyToKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Discount amount, exactly one kind per coupon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    /// Percentage in (0, 100]
    PercentOff(f64),
    /// Major currency units, > 0
    AmountOff(Decimal),
}

/// Which products a coupon is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyTo {
    All,
    Product(String),
    /// The category itself plus its direct children
    Category(String),
}

/// Validated coupon specification (code is uppercase-normalized)
#[derive(Debug, Clone, PartialEq)]
pub struct CouponSpec {
    pub code: String,
    pub discount: Discount,
    pub apply_to: ApplyTo,
}

/// Product restriction on a platform coupon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliesTo {
    #[serde(default)]
    pub products: Vec<String>,
}

/// Coupon record owned by the payment platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCoupon {
    pub id: String,
    /// Join key against [`CouponSpec::code`]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub percent_off: Option<f64>,
    /// Minor currency units
    #[serde(default)]
    pub amount_off: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub applies_to: Option<AppliesTo>,
}

impl ExternalCoupon {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn applies_to_products(&self) -> &[String] {
        self.applies_to
            .as_ref()
            .map(|a| a.products.as_slice())
            .unwrap_or_default()
    }
}

/// Create coupon payload for the payment platform
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub name: String,
    pub percent_off: Option<f64>,
    /// Minor currency units
    pub amount_off: Option<i64>,
    /// Only set for amount-based discounts
    pub currency: Option<String>,
    pub applies_to_products: Vec<String>,
}

impl NewCoupon {
    /// Build the payload for a validated spec and its resolved applicability list.
    ///
    /// Returns `None` when the amount does not fit in minor units.
    pub fn from_spec(spec: &CouponSpec, applies_to_products: Vec<String>) -> Option<Self> {
        let (percent_off, amount_off, currency) = match spec.discount {
            Discount::PercentOff(p) => (Some(p), None, None),
            Discount::AmountOff(a) => (
                None,
                Some(to_minor_units(a)?),
                Some(COUPON_CURRENCY.to_string()),
            ),
        };
        Some(Self {
            name: spec.code.clone(),
            percent_off,
            amount_off,
            currency,
            applies_to_products,
        })
    }
}

/// Redeemable code bound to a platform coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionCode {
    pub id: String,
    /// Coupon id; Stripe returns either the id or the full coupon object
    #[serde(default, deserialize_with = "coupon_id")]
    pub coupon: String,
    #[serde(default)]
    pub code: String,
}

fn coupon_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => id,
        Value::Object(obj) => obj
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}
