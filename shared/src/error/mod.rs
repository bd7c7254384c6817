//! Unified error system for the shop admin workspace
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: JSON envelope printed by the CLI
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 5xxx: Payment / coupon errors
//! - 6xxx: Catalog errors
//! - 7xxx: Settings errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::CouponCodeRequired)
//!     .with_detail("coupon", "summer");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(5101));
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
