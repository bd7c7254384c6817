//! Payment-platform seam
//!
//! The reconciler and the product mirror talk to the payment platform only
//! through these traits; [`crate::stripe::StripeClient`] is the production
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{ExternalCoupon, NewCoupon, PlatformPrice, PlatformProduct, PromotionCode};
use thiserror::Error;

/// Payment-platform call failure
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The referenced object does not exist (already deleted, never created)
    #[error("not found: {0}")]
    NotFound(String),
    /// The platform rejected the request
    #[error("platform error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Transport failure (connect, TLS, reset)
    #[error("request failed: {0}")]
    Http(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound(_))
    }
}

impl From<PlatformError> for AppError {
    fn from(e: PlatformError) -> Self {
        let code = match &e {
            PlatformError::NotFound(_) => ErrorCode::NotFound,
            PlatformError::Timeout(_) => ErrorCode::TimeoutError,
            PlatformError::Http(_) => ErrorCode::NetworkError,
            PlatformError::Api { .. } | PlatformError::Decode(_) => ErrorCode::PaymentPlatformError,
        };
        AppError::with_message(code, e.to_string())
    }
}

/// Coupon operations. Platform coupons are immutable once created.
#[async_trait]
pub trait CouponPlatform: Send + Sync {
    /// Every coupon currently on the platform
    async fn list_coupons(&self) -> Result<Vec<ExternalCoupon>, PlatformError>;

    async fn create_coupon(&self, coupon: &NewCoupon) -> Result<ExternalCoupon, PlatformError>;

    /// Fails with [`PlatformError::NotFound`] when the coupon is already gone
    async fn delete_coupon(&self, id: &str) -> Result<(), PlatformError>;

    async fn create_promotion_code(
        &self,
        coupon_id: &str,
        code: &str,
    ) -> Result<PromotionCode, PlatformError>;
}

/// Product / price operations used to mirror the local catalog
#[async_trait]
pub trait CatalogPlatform: Send + Sync {
    async fn retrieve_product(&self, id: &str) -> Result<PlatformProduct, PlatformError>;

    /// Create a platform product whose id is the local product id
    async fn create_product(&self, id: &str, name: &str) -> Result<PlatformProduct, PlatformError>;

    async fn rename_product(&self, id: &str, name: &str) -> Result<(), PlatformError>;

    /// Products with prices cannot be deleted, only deactivated
    async fn deactivate_product(&self, id: &str) -> Result<(), PlatformError>;

    async fn create_price(
        &self,
        product_id: &str,
        unit_amount: i64,
        currency: &str,
    ) -> Result<PlatformPrice, PlatformError>;
}
