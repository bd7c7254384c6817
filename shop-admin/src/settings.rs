//! Shop settings
//!
//! Settings are a small set of named JSON values. [`SettingsStore`] is the
//! persistence seam (Postgres in production, memory in tests) and
//! [`Settings`] is the typed view over it.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::error::AppError;
use shared::models::{CouponMap, RawCouponSpec, Setting, SettingKey};
use tokio::sync::RwLock;

use crate::error::ServiceResult;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when the setting was never written
    async fn get(&self, key: SettingKey) -> ServiceResult<Option<Setting>>;

    /// Insert or replace
    async fn put(&self, setting: Setting) -> ServiceResult<()>;
}

/// In-process store holding encoded values, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<SettingKey, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, as it would appear in the database
    pub async fn raw(&self, key: SettingKey) -> Option<Value> {
        self.values.read().await.get(&key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: SettingKey) -> ServiceResult<Option<Setting>> {
        let values = self.values.read().await;
        match values.get(&key) {
            Some(value) => Ok(Some(Setting::from_raw(key.as_str(), value.clone())?)),
            None => Ok(None),
        }
    }

    async fn put(&self, setting: Setting) -> ServiceResult<()> {
        let value = setting.to_value()?;
        self.values.write().await.insert(setting.key(), value);
        Ok(())
    }
}

/// Typed accessors over a [`SettingsStore`]
pub struct Settings<'a> {
    store: &'a dyn SettingsStore,
}

impl<'a> Settings<'a> {
    pub fn new(store: &'a dyn SettingsStore) -> Self {
        Self { store }
    }

    pub async fn featured_product_id(&self) -> ServiceResult<Option<String>> {
        match self.store.get(SettingKey::FeaturedProductId).await? {
            Some(Setting::FeaturedProductId(id)) => Ok(Some(id)),
            Some(other) => Err(mismatch(SettingKey::FeaturedProductId, &other).into()),
            None => Ok(None),
        }
    }

    pub async fn set_featured_product_id(&self, id: impl Into<String>) -> ServiceResult<()> {
        self.store.put(Setting::FeaturedProductId(id.into())).await
    }

    pub async fn shipping_fee(&self) -> ServiceResult<Option<Decimal>> {
        match self.store.get(SettingKey::ShippingFee).await? {
            Some(Setting::ShippingFee(fee)) => Ok(Some(fee)),
            Some(other) => Err(mismatch(SettingKey::ShippingFee, &other).into()),
            None => Ok(None),
        }
    }

    pub async fn set_shipping_fee(&self, fee: Decimal) -> ServiceResult<()> {
        if fee < Decimal::ZERO {
            return Err(AppError::validation(format!("Shipping fee must not be negative: {fee}")).into());
        }
        self.store.put(Setting::ShippingFee(fee)).await
    }

    pub async fn shop_name(&self) -> ServiceResult<Option<String>> {
        match self.store.get(SettingKey::ShopName).await? {
            Some(Setting::ShopName(name)) => Ok(Some(name)),
            Some(other) => Err(mismatch(SettingKey::ShopName, &other).into()),
            None => Ok(None),
        }
    }

    pub async fn set_shop_name(&self, name: impl Into<String>) -> ServiceResult<()> {
        self.store.put(Setting::ShopName(name.into())).await
    }

    /// Desired coupon specification; empty when never saved
    pub async fn coupons(&self) -> ServiceResult<CouponMap> {
        match self.store.get(SettingKey::Coupons).await? {
            Some(Setting::Coupons(coupons)) => Ok(coupons),
            Some(other) => Err(mismatch(SettingKey::Coupons, &other).into()),
            None => Ok(CouponMap::new()),
        }
    }

    /// Coupons as a list, in key order
    pub async fn coupon_list(&self) -> ServiceResult<Vec<RawCouponSpec>> {
        Ok(self.coupons().await?.into_values().collect())
    }
}

fn mismatch(key: SettingKey, got: &Setting) -> AppError {
    AppError::internal(format!("Store returned {} for {key}", got.key()))
}
