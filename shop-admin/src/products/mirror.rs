//! Product / price mirroring
//!
//! Checkout needs a platform price per product. The platform product shares
//! the local product's id; prices are immutable there, so a price change
//! creates a new price and the caller persists its id.

use shared::error::{AppError, ErrorCode};
use shared::models::{PlatformProduct, Product};

use crate::error::ServiceResult;
use crate::platform::CatalogPlatform;

/// Currency of mirrored prices
pub const PRICE_CURRENCY: &str = "usd";

pub struct ProductMirror<'a> {
    platform: &'a dyn CatalogPlatform,
}

impl<'a> ProductMirror<'a> {
    pub fn new(platform: &'a dyn CatalogPlatform) -> Self {
        Self { platform }
    }

    /// Create the platform product and its first price; returns the price id
    pub async fn on_created(&self, product: &Product) -> ServiceResult<String> {
        let unit_amount = unit_amount(product)?;
        self.platform
            .create_product(&product.id, &product.title)
            .await?;
        let price = self
            .platform
            .create_price(&product.id, unit_amount, PRICE_CURRENCY)
            .await?;
        tracing::info!(product_id = %product.id, price_id = %price.id, unit_amount, "Product mirrored");
        Ok(price.id)
    }

    /// Bring the platform product in line with `current`; returns the price id to persist
    pub async fn on_updated(&self, previous: &Product, current: &Product) -> ServiceResult<String> {
        let unit_amount = unit_amount(current)?;
        let platform_product = self.ensure_product(current).await?;

        if platform_product.name != current.title {
            self.platform
                .rename_product(&current.id, &current.title)
                .await?;
            tracing::info!(product_id = %current.id, title = %current.title, "Platform product renamed");
        }

        match &current.stripe_price_id {
            Some(price_id) if previous.price == current.price => Ok(price_id.clone()),
            _ => {
                let price = self
                    .platform
                    .create_price(&current.id, unit_amount, PRICE_CURRENCY)
                    .await?;
                tracing::info!(
                    product_id = %current.id,
                    price_id = %price.id,
                    unit_amount,
                    "New platform price"
                );
                Ok(price.id)
            }
        }
    }

    /// Products with prices cannot be deleted on the platform, only deactivated
    pub async fn on_deleted(&self, product: &Product) -> ServiceResult<()> {
        match self.platform.deactivate_product(&product.id).await {
            Ok(()) => {
                tracing::info!(product_id = %product.id, "Platform product deactivated");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(product_id = %product.id, "No platform product to deactivate");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_product(&self, product: &Product) -> ServiceResult<PlatformProduct> {
        match self.platform.retrieve_product(&product.id).await {
            Ok(existing) => Ok(existing),
            Err(e) if e.is_not_found() => {
                tracing::info!(product_id = %product.id, "Platform product missing, creating");
                Ok(self
                    .platform
                    .create_product(&product.id, &product.title)
                    .await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn unit_amount(product: &Product) -> Result<i64, AppError> {
    match product.unit_amount() {
        Some(amount) if amount > 0 => Ok(amount),
        _ => Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("Product {} has invalid price {}", product.id, product.price),
        )
        .with_detail("product_id", product.id.as_str())),
    }
}
