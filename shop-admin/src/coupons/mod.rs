//! Coupon specification handling and platform synchronization
//!
//! - [`validate`]: loose dashboard specs -> validated [`CouponSpec`]s
//! - [`applicability`]: which products a coupon is restricted to
//! - [`reconcile`]: converge platform coupons on the desired specification
//!
//! [`CouponSpec`]: shared::models::CouponSpec

pub mod applicability;
pub mod reconcile;
pub mod validate;

pub use applicability::resolve_applicability;
pub use reconcile::{CouponFailure, CouponReconciler, ReconcileOptions, ReconcileReport, SyncStage};
pub use validate::{normalize_code, validate_coupon, validate_coupons};
