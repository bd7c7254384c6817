//! Application state for shop-admin

use chrono::Utc;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CouponMap, Order, Product};
use sqlx::PgPool;

use crate::config::Config;
use crate::coupons::{CouponReconciler, ReconcileOptions, ReconcileReport};
use crate::db::{self, PgSettingsStore};
use crate::error::ServiceResult;
use crate::products::ProductMirror;
use crate::settings::Settings;
use crate::stats::StatsWindow;
use crate::stripe::StripeClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Stripe REST client (coupons and product mirror)
    pub stripe: StripeClient,
    /// Settings persisted in PostgreSQL
    pub settings_store: PgSettingsStore,
    pub reconcile_options: ReconcileOptions,
}

impl AppState {
    /// Connect, migrate and build the platform client
    pub async fn new(config: &Config) -> ServiceResult<Self> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database ready");

        let stripe = StripeClient::from_config(config)?;

        Ok(Self {
            settings_store: PgSettingsStore::new(pool.clone()),
            pool,
            stripe,
            reconcile_options: ReconcileOptions {
                call_timeout: config.stripe_timeout,
                concurrency: config.coupon_sync_concurrency,
            },
        })
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings::new(&self.settings_store)
    }

    pub fn coupon_reconciler(&self) -> CouponReconciler<'_> {
        CouponReconciler::new(&self.stripe, &self.settings_store)
            .with_options(self.reconcile_options)
    }

    pub fn product_mirror(&self) -> ProductMirror<'_> {
        ProductMirror::new(&self.stripe)
    }

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(db::catalog::list_categories(&self.pool).await?)
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(db::catalog::list_products(&self.pool).await?)
    }

    /// Orders young enough to fall in the widest stats window
    pub async fn recent_orders(&self) -> ServiceResult<Vec<Order>> {
        let since = Utc::now() - StatsWindow::Year.duration();
        Ok(db::orders::list_orders_since(&self.pool, since).await?)
    }

    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        db::catalog::get_product(&self.pool, id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
                    .with_detail("product_id", id)
                    .into()
            })
    }

    /// Reconcile `desired` against the platform using the current catalog.
    ///
    /// `desired` is saved even when the catalog cannot be read.
    pub async fn sync_coupons(&self, desired: &CouponMap) -> ServiceResult<ReconcileReport> {
        let reconciler = self.coupon_reconciler();
        match self.list_products().await {
            Ok(products) => reconciler.reconcile(desired, &products).await,
            Err(e) => reconciler.reconcile_without_catalog(desired, e).await,
        }
    }

    /// Re-mirror one product and persist its price id when it changed
    pub async fn mirror_product(&self, id: &str) -> ServiceResult<String> {
        let product = self.get_product(id).await?;
        let price_id = self.product_mirror().on_updated(&product, &product).await?;
        if product.stripe_price_id.as_deref() != Some(price_id.as_str()) {
            db::catalog::set_stripe_price_id(&self.pool, &product.id, &price_id).await?;
            tracing::info!(product_id = %product.id, price_id = %price_id, "Price id updated");
        }
        Ok(price_id)
    }
}
