//! Coupon reconciliation
//!
//! Converges the payment platform's coupons on the locally authored
//! specification. Platform coupons are immutable, so every desired coupon is
//! replaced on each run: stale copies (matched by name == code) are deleted,
//! a fresh coupon is created with the current applicability list, then a
//! promotion code is attached.
//!
//! Per-coupon failures are collected into the [`ReconcileReport`]; one coupon
//! failing never stops the others. The desired specification is saved to the
//! settings store after the platform pass whatever its outcome, and also when
//! the product catalog could not be read.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{CouponMap, CouponSpec, ExternalCoupon, NewCoupon, Product, Setting};

use super::applicability::resolve_applicability;
use super::validate::validate_coupons;
use crate::error::ServiceResult;
use crate::platform::{CouponPlatform, PlatformError};
use crate::settings::SettingsStore;

/// Step at which a coupon failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// Listing platform coupons (affects every coupon in the run)
    List,
    /// Deleting a stale platform copy
    Delete,
    /// Resolving the applicability list
    Catalog,
    Create,
    PromotionCode,
    /// Deleting a platform coupon no longer desired
    Remove,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::List => "list",
            SyncStage::Delete => "delete",
            SyncStage::Catalog => "catalog",
            SyncStage::Create => "create",
            SyncStage::PromotionCode => "promotion_code",
            SyncStage::Remove => "remove",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponFailure {
    pub code: String,
    pub stage: SyncStage,
    pub error: String,
}

impl CouponFailure {
    fn new(code: &str, stage: SyncStage, error: impl fmt::Display) -> Self {
        Self {
            code: code.to_string(),
            stage,
            error: error.to_string(),
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Codes now live on the platform with a promotion code
    pub succeeded: Vec<String>,
    pub failed: Vec<CouponFailure>,
    /// Platform coupon names deleted because they are no longer desired
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_codes(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.code.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Upper bound for each individual platform call
    pub call_timeout: Duration,
    /// Coupons synchronized at once
    pub concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            concurrency: 1,
        }
    }
}

/// Per-coupon lifecycle
enum CouponState<'e> {
    /// No platform coupon carries the code
    Absent,
    /// Platform copies exist and must be replaced
    Stale(Vec<&'e ExternalCoupon>),
    Deleted,
    /// Fresh coupon live, promotion code pending
    Created(ExternalCoupon),
}

pub struct CouponReconciler<'a> {
    platform: &'a dyn CouponPlatform,
    settings: &'a dyn SettingsStore,
    options: ReconcileOptions,
}

impl<'a> CouponReconciler<'a> {
    pub fn new(platform: &'a dyn CouponPlatform, settings: &'a dyn SettingsStore) -> Self {
        Self {
            platform,
            settings,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate `desired`, sync it to the platform, then persist it.
    ///
    /// Returns `Err` only when validation fails (nothing touched) or when the
    /// specification cannot be saved. Platform failures land in the report.
    pub async fn reconcile(
        &self,
        desired: &CouponMap,
        products: &[Product],
    ) -> ServiceResult<ReconcileReport> {
        let specs = validate_coupons(desired)?;
        let mut report = ReconcileReport::default();

        tracing::info!(
            coupons = specs.len(),
            products = products.len(),
            concurrency = self.options.concurrency,
            "Reconciling coupons"
        );

        match self.call(self.platform.list_coupons()).await {
            Ok(external) => {
                let by_name = group_by_name(&external);
                self.sync_all(&specs, &by_name, products, &mut report).await;
                self.remove_unlisted(&specs, &by_name, &mut report).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list platform coupons");
                report.failed.extend(
                    specs
                        .keys()
                        .map(|code| CouponFailure::new(code, SyncStage::List, &e)),
                );
            }
        }

        self.save(desired, report).await
    }

    /// Save `desired` when the product catalog could not be loaded.
    ///
    /// Applicability cannot be resolved, so the platform is left untouched and
    /// every code fails at [`SyncStage::Catalog`]. Validation still applies.
    pub async fn reconcile_without_catalog(
        &self,
        desired: &CouponMap,
        error: impl fmt::Display,
    ) -> ServiceResult<ReconcileReport> {
        let specs = validate_coupons(desired)?;
        let error = error.to_string();
        tracing::error!(error = %error, "Product catalog unavailable, coupons not synced");

        let report = ReconcileReport {
            failed: specs
                .keys()
                .map(|code| CouponFailure::new(code, SyncStage::Catalog, &error))
                .collect(),
            ..Default::default()
        };
        self.save(desired, report).await
    }

    async fn save(
        &self,
        desired: &CouponMap,
        report: ReconcileReport,
    ) -> ServiceResult<ReconcileReport> {
        self.settings.put(Setting::Coupons(desired.clone())).await?;

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            removed = report.removed.len(),
            "Coupon reconciliation finished"
        );
        Ok(report)
    }

    async fn sync_all(
        &self,
        specs: &BTreeMap<String, CouponSpec>,
        by_name: &BTreeMap<&str, Vec<&ExternalCoupon>>,
        products: &[Product],
        report: &mut ReconcileReport,
    ) {
        let outcomes: Vec<_> = stream::iter(specs.values())
            .map(|spec| {
                let existing = by_name.get(spec.code.as_str()).cloned().unwrap_or_default();
                self.sync_coupon(spec, existing, products)
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        for (spec, outcome) in specs.values().zip(outcomes) {
            match outcome {
                Ok(()) => report.succeeded.push(spec.code.clone()),
                Err(failure) => {
                    tracing::warn!(
                        coupon = %failure.code,
                        stage = %failure.stage,
                        error = %failure.error,
                        "Coupon sync failed"
                    );
                    report.failed.push(failure);
                }
            }
        }
    }

    async fn sync_coupon(
        &self,
        spec: &CouponSpec,
        existing: Vec<&ExternalCoupon>,
        products: &[Product],
    ) -> Result<(), CouponFailure> {
        let code = spec.code.as_str();
        let mut state = if existing.is_empty() {
            CouponState::Absent
        } else {
            CouponState::Stale(existing)
        };

        loop {
            state = match state {
                CouponState::Stale(stale) => {
                    for coupon in stale {
                        match self.call(self.platform.delete_coupon(&coupon.id)).await {
                            Ok(()) => {
                                tracing::debug!(coupon = %code, coupon_id = %coupon.id, "Deleted stale coupon")
                            }
                            Err(e) if e.is_not_found() => {
                                tracing::debug!(coupon = %code, coupon_id = %coupon.id, "Stale coupon already gone")
                            }
                            Err(e) => return Err(CouponFailure::new(code, SyncStage::Delete, e)),
                        }
                    }
                    CouponState::Deleted
                }
                CouponState::Absent | CouponState::Deleted => {
                    let applies_to = resolve_applicability(&spec.apply_to, products);
                    if applies_to.is_empty() {
                        return Err(CouponFailure::new(
                            code,
                            SyncStage::Catalog,
                            AppError::new(ErrorCode::CouponNoProducts),
                        ));
                    }
                    let payload = NewCoupon::from_spec(spec, applies_to).ok_or_else(|| {
                        CouponFailure::new(
                            code,
                            SyncStage::Catalog,
                            AppError::new(ErrorCode::ValueOutOfRange),
                        )
                    })?;
                    let coupon = self
                        .call(self.platform.create_coupon(&payload))
                        .await
                        .map_err(|e| CouponFailure::new(code, SyncStage::Create, e))?;
                    tracing::debug!(
                        coupon = %code,
                        coupon_id = %coupon.id,
                        products = payload.applies_to_products.len(),
                        "Created coupon"
                    );
                    CouponState::Created(coupon)
                }
                CouponState::Created(coupon) => {
                    let promo = self
                        .call(self.platform.create_promotion_code(&coupon.id, code))
                        .await
                        .map_err(|e| CouponFailure::new(code, SyncStage::PromotionCode, e))?;
                    tracing::info!(coupon = %code, coupon_id = %coupon.id, promotion_code_id = %promo.id, "Coupon synced");
                    return Ok(());
                }
            };
        }
    }

    /// Delete platform coupons whose name is no longer a desired code
    async fn remove_unlisted(
        &self,
        specs: &BTreeMap<String, CouponSpec>,
        by_name: &BTreeMap<&str, Vec<&ExternalCoupon>>,
        report: &mut ReconcileReport,
    ) {
        for (name, coupons) in by_name {
            if specs.contains_key(*name) {
                continue;
            }
            let mut removed = true;
            for coupon in coupons {
                match self.call(self.platform.delete_coupon(&coupon.id)).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => {
                        tracing::warn!(coupon = %name, coupon_id = %coupon.id, error = %e, "Failed to remove coupon");
                        report.failed.push(CouponFailure::new(name, SyncStage::Remove, e));
                        removed = false;
                    }
                }
            }
            if removed {
                tracing::info!(coupon = %name, "Removed coupon no longer specified");
                report.removed.push(name.to_string());
            }
        }
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, PlatformError>>,
    ) -> Result<T, PlatformError> {
        let limit = self.options.call_timeout;
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| PlatformError::Timeout(limit))?
    }
}

/// Named platform coupons grouped by name; unnamed ones are not ours to manage
fn group_by_name(external: &[ExternalCoupon]) -> BTreeMap<&str, Vec<&ExternalCoupon>> {
    let mut by_name: BTreeMap<&str, Vec<&ExternalCoupon>> = BTreeMap::new();
    let mut unnamed = 0usize;
    for coupon in external {
        match coupon.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => by_name.entry(name).or_default().push(coupon),
            None => unnamed += 1,
        }
    }
    if unnamed > 0 {
        tracing::debug!(count = unnamed, "Ignoring unnamed platform coupons");
    }
    by_name
}
