//! Store Settings Model
//!
//! Settings are persisted as name -> JSON value. Each known name has exactly one
//! typed variant; the name is only resolved at the storage boundary.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde_json::Value;

use super::coupon::RawCouponSpec;
use crate::error::{AppError, ErrorCode};

/// Coupon specification as authored: coupon code -> coupon
pub type CouponMap = BTreeMap<String, RawCouponSpec>;

/// Known setting names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    FeaturedProductId,
    ShippingFee,
    ShopName,
    Coupons,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::FeaturedProductId,
        SettingKey::ShippingFee,
        SettingKey::ShopName,
        SettingKey::Coupons,
    ];

    /// Persisted name
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettingKey::FeaturedProductId => "featuredProductId",
            SettingKey::ShippingFee => "shippingFee",
            SettingKey::ShopName => "shopName",
            SettingKey::Coupons => "coupons",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed setting value
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    FeaturedProductId(String),
    /// Shipping fee in major currency units
    ShippingFee(Decimal),
    ShopName(String),
    Coupons(CouponMap),
}

impl Setting {
    pub fn key(&self) -> SettingKey {
        match self {
            Setting::FeaturedProductId(_) => SettingKey::FeaturedProductId,
            Setting::ShippingFee(_) => SettingKey::ShippingFee,
            Setting::ShopName(_) => SettingKey::ShopName,
            Setting::Coupons(_) => SettingKey::Coupons,
        }
    }

    /// Encode the value for storage
    pub fn to_value(&self) -> Result<Value, AppError> {
        let value = match self {
            Setting::FeaturedProductId(id) => Value::from(id.as_str()),
            Setting::ShippingFee(fee) => serde_json::to_value(fee).map_err(invalid(self.key()))?,
            Setting::ShopName(name) => Value::from(name.as_str()),
            Setting::Coupons(coupons) => {
                serde_json::to_value(coupons).map_err(invalid(self.key()))?
            }
        };
        Ok(value)
    }

    /// Decode a stored `(name, value)` pair
    pub fn from_raw(name: &str, value: Value) -> Result<Self, AppError> {
        let key = SettingKey::from_name(name).ok_or_else(|| {
            AppError::with_message(ErrorCode::SettingNotFound, format!("Unknown setting: {name}"))
                .with_detail("name", name)
        })?;

        let setting = match key {
            SettingKey::FeaturedProductId => {
                Setting::FeaturedProductId(serde_json::from_value(value).map_err(invalid(key))?)
            }
            SettingKey::ShippingFee => {
                Setting::ShippingFee(serde_json::from_value(value).map_err(invalid(key))?)
            }
            SettingKey::ShopName => {
                Setting::ShopName(serde_json::from_value(value).map_err(invalid(key))?)
            }
            // The editor stores an empty value before the first coupon is added
            SettingKey::Coupons if value.is_null() => Setting::Coupons(CouponMap::new()),
            SettingKey::Coupons => {
                Setting::Coupons(serde_json::from_value(value).map_err(invalid(key))?)
            }
        };
        Ok(setting)
    }
}

fn invalid(key: SettingKey) -> impl Fn(serde_json::Error) -> AppError {
    move |e| {
        AppError::with_message(ErrorCode::SettingInvalid, format!("Invalid {key}: {e}"))
            .with_detail("name", key.as_str())
    }
}
