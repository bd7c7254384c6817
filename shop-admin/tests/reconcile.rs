//! Coupon reconciliation against an in-memory payment platform

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use shared::error::ErrorCode;
use shared::models::{
    AppliesTo, ApplyToKind, CategorySnapshot, CouponMap, ExternalCoupon, NewCoupon, ParentRef,
    Product, PromotionCode, RawCouponSpec, Setting, SettingKey,
};
use shop_admin::ServiceError;
use shop_admin::coupons::{CouponReconciler, ReconcileOptions, SyncStage};
use shop_admin::platform::{CouponPlatform, PlatformError};
use shop_admin::settings::{MemorySettingsStore, SettingsStore};

#[derive(Default)]
struct FakeState {
    coupons: Vec<ExternalCoupon>,
    promotion_codes: Vec<PromotionCode>,
    next_id: u32,
    calls: Vec<String>,
}

#[derive(Default)]
struct FakePlatform {
    state: Mutex<FakeState>,
    fail_list: bool,
    /// Coupon names whose creation is rejected
    fail_create: HashSet<String>,
    /// Coupon ids whose deletion reports "not found"
    vanished: HashSet<String>,
    /// Coupon ids whose deletion is rejected; the coupon stays
    fail_delete: HashSet<String>,
    create_delay: Option<Duration>,
}

impl FakePlatform {
    fn with_coupons(coupons: Vec<ExternalCoupon>) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().coupons = coupons;
        fake
    }

    fn coupons_named(&self, name: &str) -> Vec<ExternalCoupon> {
        self.state
            .lock()
            .unwrap()
            .coupons
            .iter()
            .filter(|c| c.name.as_deref() == Some(name))
            .cloned()
            .collect()
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl CouponPlatform for FakePlatform {
    async fn list_coupons(&self) -> Result<Vec<ExternalCoupon>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list".into());
        if self.fail_list {
            return Err(PlatformError::Http("connection reset".into()));
        }
        Ok(state.coupons.clone())
    }

    async fn create_coupon(&self, coupon: &NewCoupon) -> Result<ExternalCoupon, PlatformError> {
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create:{}", coupon.name));
        if self.fail_create.contains(&coupon.name) {
            return Err(PlatformError::Api {
                status: 400,
                message: "rejected".into(),
            });
        }
        state.next_id += 1;
        let created = ExternalCoupon {
            id: format!("co_{}", state.next_id),
            name: Some(coupon.name.clone()),
            percent_off: coupon.percent_off,
            amount_off: coupon.amount_off,
            currency: coupon.currency.clone(),
            applies_to: Some(AppliesTo {
                products: coupon.applies_to_products.clone(),
            }),
        };
        state.coupons.push(created.clone());
        Ok(created)
    }

    async fn delete_coupon(&self, id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete:{id}"));
        if self.fail_delete.contains(id) {
            return Err(PlatformError::Api {
                status: 500,
                message: "internal error".into(),
            });
        }
        let before = state.coupons.len();
        state.coupons.retain(|c| c.id != id);
        state.promotion_codes.retain(|p| p.coupon != id);
        if self.vanished.contains(id) || state.coupons.len() == before {
            return Err(PlatformError::NotFound(format!("No such coupon: '{id}'")));
        }
        Ok(())
    }

    async fn create_promotion_code(
        &self,
        coupon_id: &str,
        code: &str,
    ) -> Result<PromotionCode, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("promo:{code}"));
        state.next_id += 1;
        let promo = PromotionCode {
            id: format!("promo_{}", state.next_id),
            coupon: coupon_id.to_string(),
            code: code.to_string(),
        };
        state.promotion_codes.push(promo.clone());
        Ok(promo)
    }
}

fn external(id: &str, name: &str) -> ExternalCoupon {
    ExternalCoupon {
        id: id.to_string(),
        name: Some(name.to_string()),
        percent_off: Some(5.0),
        amount_off: None,
        currency: None,
        applies_to: None,
    }
}

fn product(id: &str, category: Option<(&str, Option<&str>)>) -> Product {
    Product {
        id: id.to_string(),
        title: format!("Product {id}"),
        description: String::new(),
        price: Decimal::new(1000, 2),
        images: vec![],
        category: category.map(|(cid, parent)| CategorySnapshot {
            id: cid.to_string(),
            name: cid.to_string(),
            parent: parent.map(|p| ParentRef { id: p.to_string() }),
            properties: vec![],
        }),
        properties: Default::default(),
        stripe_price_id: None,
        hidden: false,
    }
}

fn percent(code: &str, p: f64) -> RawCouponSpec {
    RawCouponSpec {
        code: code.to_string(),
        percent_off: Some(p),
        ..Default::default()
    }
}

fn desired(specs: Vec<RawCouponSpec>) -> CouponMap {
    specs.into_iter().map(|s| (s.code.clone(), s)).collect()
}

async fn saved_coupons(store: &MemorySettingsStore) -> Option<CouponMap> {
    match store.get(SettingKey::Coupons).await.unwrap() {
        Some(Setting::Coupons(coupons)) => Some(coupons),
        _ => None,
    }
}

#[tokio::test]
async fn resync_is_idempotent() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let products = vec![product("p1", None), product("p2", None)];
    let spec = desired(vec![percent("SAVE10", 10.0)]);

    for _ in 0..2 {
        let report = CouponReconciler::new(&platform, &store)
            .reconcile(&spec, &products)
            .await
            .unwrap();
        assert_eq!(report.succeeded, ["SAVE10"]);
        assert!(report.is_clean());
    }

    let live = platform.coupons_named("SAVE10");
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].percent_off, Some(10.0));
    assert_eq!(live[0].applies_to_products(), ["p1", "p2"]);

    let promos = platform.state.lock().unwrap().promotion_codes.clone();
    assert_eq!(promos.len(), 1);
    assert_eq!(promos[0].code, "SAVE10");
    assert_eq!(promos[0].coupon, live[0].id);

    assert_eq!(saved_coupons(&store).await, Some(spec));
}

#[tokio::test]
async fn category_coupon_covers_category_and_children() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let products = vec![
        product("p1", Some(("catX", None))),
        product("p2", Some(("shirts", Some("catX")))),
        product("p3", Some(("catY", None))),
    ];
    let spec = desired(vec![RawCouponSpec {
        apply_to: ApplyToKind::Category,
        category: Some("catX".into()),
        ..percent("CAT", 15.0)
    }]);

    CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &products)
        .await
        .unwrap();

    let live = platform.coupons_named("CAT");
    assert_eq!(live[0].applies_to_products(), ["p1", "p2"]);
}

#[tokio::test]
async fn amount_coupon_uses_minor_units() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let spec = desired(vec![RawCouponSpec {
        code: "FIVE".into(),
        amount_off: Some(Decimal::new(500, 2)),
        apply_to: ApplyToKind::Product,
        product: Some("p2".into()),
        ..Default::default()
    }]);

    CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    let live = platform.coupons_named("FIVE");
    assert_eq!(live[0].amount_off, Some(500));
    assert_eq!(live[0].currency.as_deref(), Some("usd"));
    assert_eq!(live[0].applies_to_products(), ["p2"]);
}

#[tokio::test]
async fn one_failure_does_not_stop_the_others() {
    let platform = FakePlatform {
        fail_create: HashSet::from(["B".to_string()]),
        ..Default::default()
    };
    let store = MemorySettingsStore::new();
    let spec = desired(vec![percent("A", 5.0), percent("B", 5.0), percent("C", 5.0)]);

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["A", "C"]);
    assert_eq!(report.failed_codes(), ["B"]);
    assert_eq!(report.failed[0].stage, SyncStage::Create);
    assert_eq!(saved_coupons(&store).await.unwrap().len(), 3);
}

#[tokio::test]
async fn invalid_spec_aborts_before_any_platform_call() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let spec = desired(vec![percent("A", 10.0), percent("B", 0.0)]);

    let result = CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await;

    match result {
        Err(ServiceError::App(e)) => assert_eq!(e.code, ErrorCode::ValueOutOfRange),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(platform.calls().is_empty());
    assert!(saved_coupons(&store).await.is_none());
}

#[tokio::test]
async fn stale_coupon_already_deleted_is_tolerated() {
    let platform = FakePlatform {
        vanished: HashSet::from(["co_gone".to_string()]),
        ..FakePlatform::with_coupons(vec![external("co_gone", "SAVE10")])
    };
    let store = MemorySettingsStore::new();

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&desired(vec![percent("SAVE10", 10.0)]), &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["SAVE10"]);
    assert_eq!(
        platform.calls(),
        ["list", "delete:co_gone", "create:SAVE10", "promo:SAVE10"]
    );
}

#[tokio::test]
async fn duplicate_platform_copies_converge_to_one() {
    let platform = FakePlatform::with_coupons(vec![
        external("co_a", "SAVE10"),
        external("co_b", "SAVE10"),
    ]);
    let store = MemorySettingsStore::new();

    CouponReconciler::new(&platform, &store)
        .reconcile(&desired(vec![percent("save10", 10.0)]), &[product("p1", None)])
        .await
        .unwrap();

    let live = platform.coupons_named("SAVE10");
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].percent_off, Some(10.0));
}

#[tokio::test]
async fn coupons_left_out_of_the_spec_are_removed() {
    let mut unnamed = external("co_manual", "");
    unnamed.name = None;
    let platform = FakePlatform::with_coupons(vec![external("co_old", "OLD"), unnamed]);
    let store = MemorySettingsStore::new();

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&desired(vec![percent("NEW", 10.0)]), &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["NEW"]);
    assert_eq!(report.removed, ["OLD"]);
    assert!(platform.coupons_named("OLD").is_empty());

    // coupons without a name are not ours
    let ids: Vec<_> = platform
        .state
        .lock()
        .unwrap()
        .coupons
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert!(ids.contains(&"co_manual".to_string()));
}

#[tokio::test]
async fn empty_applicability_fails_the_coupon() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let spec = desired(vec![RawCouponSpec {
        apply_to: ApplyToKind::Category,
        category: Some("empty".into()),
        ..percent("NOBODY", 10.0)
    }]);

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.failed[0].stage, SyncStage::Catalog);
    assert!(platform.coupons_named("NOBODY").is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_platform_call_times_out() {
    let platform = FakePlatform {
        create_delay: Some(Duration::from_secs(30)),
        ..Default::default()
    };
    let store = MemorySettingsStore::new();
    let options = ReconcileOptions {
        call_timeout: Duration::from_millis(200),
        concurrency: 1,
    };

    let report = CouponReconciler::new(&platform, &store)
        .with_options(options)
        .reconcile(&desired(vec![percent("SLOW", 10.0)]), &[product("p1", None)])
        .await
        .unwrap();

    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed[0].stage, SyncStage::Create);
    assert!(report.failed[0].error.contains("timed out"));
    assert!(saved_coupons(&store).await.is_some());
}

#[tokio::test]
async fn list_failure_fails_every_coupon_but_still_saves() {
    let platform = FakePlatform {
        fail_list: true,
        ..FakePlatform::with_coupons(vec![external("co_old", "OLD")])
    };
    let store = MemorySettingsStore::new();

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&desired(vec![percent("A", 5.0), percent("B", 5.0)]), &[])
        .await
        .unwrap();

    assert_eq!(report.failed_codes(), ["A", "B"]);
    assert!(report.failed.iter().all(|f| f.stage == SyncStage::List));
    assert!(report.removed.is_empty());
    assert_eq!(platform.calls(), ["list"]);
    assert!(saved_coupons(&store).await.is_some());
}

#[tokio::test]
async fn concurrent_sync_reports_in_code_order() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let options = ReconcileOptions {
        call_timeout: Duration::from_secs(5),
        concurrency: 4,
    };
    let spec = desired(vec![percent("C", 5.0), percent("A", 5.0), percent("B", 5.0)]);

    let report = CouponReconciler::new(&platform, &store)
        .with_options(options)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["A", "B", "C"]);
}

#[tokio::test]
async fn editor_fields_are_saved_verbatim() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let mut spec = percent("save10", 10.0);
    spec.extra.insert("type".into(), json!("percent"));
    let spec = desired(vec![spec]);

    CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    let raw = store.raw(SettingKey::Coupons).await.unwrap();
    assert_eq!(raw["save10"]["code"], "save10");
    assert_eq!(raw["save10"]["type"], "percent");
    assert_eq!(platform.coupons_named("SAVE10").len(), 1);
}

#[tokio::test]
async fn oversized_amount_fails_only_that_coupon() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();
    let spec = desired(vec![
        RawCouponSpec {
            code: "HUGE".into(),
            amount_off: Some(Decimal::from_i128_with_scale(10i128.pow(27), 0)),
            ..Default::default()
        },
        percent("SAVE10", 10.0),
    ]);

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&spec, &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["SAVE10"]);
    assert_eq!(report.failed_codes(), ["HUGE"]);
    assert_eq!(report.failed[0].stage, SyncStage::Catalog);
    assert!(platform.coupons_named("HUGE").is_empty());
    let saved = saved_coupons(&store).await.unwrap();
    assert!(saved.contains_key("HUGE") && saved.contains_key("SAVE10"));
}

#[tokio::test]
async fn failed_removal_does_not_stop_other_removals() {
    let platform = FakePlatform {
        fail_delete: HashSet::from(["co_a".to_string()]),
        ..FakePlatform::with_coupons(vec![
            external("co_a", "OLD"),
            external("co_b", "OLD"),
            external("co_c", "GONE"),
        ])
    };
    let store = MemorySettingsStore::new();

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&desired(vec![percent("NEW", 10.0)]), &[product("p1", None)])
        .await
        .unwrap();

    assert_eq!(report.succeeded, ["NEW"]);
    assert_eq!(report.removed, ["GONE"]);
    assert_eq!(report.failed_codes(), ["OLD"]);
    assert_eq!(report.failed[0].stage, SyncStage::Remove);

    // the sibling copy and the other name are still deleted
    let calls = platform.calls();
    assert!(calls.contains(&"delete:co_b".to_string()));
    assert!(calls.contains(&"delete:co_c".to_string()));
    let old: Vec<_> = platform.coupons_named("OLD").into_iter().map(|c| c.id).collect();
    assert_eq!(old, ["co_a"]);
    assert!(platform.coupons_named("GONE").is_empty());

    assert!(saved_coupons(&store).await.is_some());
}

#[tokio::test]
async fn every_failed_copy_is_reported() {
    let platform = FakePlatform {
        fail_delete: HashSet::from(["co_a".to_string(), "co_b".to_string()]),
        ..FakePlatform::with_coupons(vec![external("co_a", "OLD"), external("co_b", "OLD")])
    };
    let store = MemorySettingsStore::new();

    let report = CouponReconciler::new(&platform, &store)
        .reconcile(&CouponMap::new(), &[])
        .await
        .unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(report.failed_codes(), ["OLD", "OLD"]);
    assert!(report.failed.iter().all(|f| f.stage == SyncStage::Remove));
}

#[tokio::test]
async fn catalog_outage_still_saves_without_platform_calls() {
    let platform = FakePlatform::with_coupons(vec![external("co_old", "OLD")]);
    let store = MemorySettingsStore::new();
    let spec = desired(vec![percent("A", 5.0), percent("b", 5.0)]);

    let report = CouponReconciler::new(&platform, &store)
        .reconcile_without_catalog(&spec, "pool timed out")
        .await
        .unwrap();

    assert!(report.succeeded.is_empty());
    assert!(report.removed.is_empty());
    assert_eq!(report.failed_codes(), ["A", "B"]);
    assert!(report.failed.iter().all(|f| f.stage == SyncStage::Catalog));
    assert_eq!(report.failed[0].error, "pool timed out");
    assert!(platform.calls().is_empty());
    assert_eq!(saved_coupons(&store).await, Some(spec));
}

#[tokio::test]
async fn catalog_outage_still_validates() {
    let platform = FakePlatform::default();
    let store = MemorySettingsStore::new();

    let result = CouponReconciler::new(&platform, &store)
        .reconcile_without_catalog(&desired(vec![percent("A", 150.0)]), "pool timed out")
        .await;

    assert!(matches!(result, Err(ServiceError::App(_))));
    assert!(saved_coupons(&store).await.is_none());
}
