//! Unified error codes for the shop admin workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 5xxx: Payment / coupon errors
//! - 6xxx: Catalog errors
//! - 7xxx: Settings errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they serialize compactly
/// and stay stable across the CLI's JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 5xxx: Payment ====================
    /// Payment platform rejected or failed a call
    PaymentPlatformError = 5001,
    /// Coupon code is empty
    CouponCodeRequired = 5101,
    /// Coupon must set exactly one of percentOff / amountOff
    CouponDiscountInvalid = 5102,
    /// Coupon scope is missing its product / category target
    CouponTargetMissing = 5103,
    /// Coupon resolves to no products
    CouponNoProducts = 5104,
    /// Coupon names a target that its scope does not use
    CouponTargetMismatch = 5105,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Category not found
    CategoryNotFound = 6101,

    // ==================== 7xxx: Settings ====================
    /// Unknown setting name
    SettingNotFound = 7001,
    /// Setting value has the wrong shape
    SettingInvalid = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Payment
            ErrorCode::PaymentPlatformError => "Payment platform request failed",
            ErrorCode::CouponCodeRequired => "Coupon code is required",
            ErrorCode::CouponDiscountInvalid => {
                "Coupon must set exactly one of percent off or amount off"
            }
            ErrorCode::CouponTargetMissing => "Coupon scope requires a product or category",
            ErrorCode::CouponNoProducts => "Coupon applies to no products",
            ErrorCode::CouponTargetMismatch => "Coupon target does not match its scope",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",

            // Settings
            ErrorCode::SettingNotFound => "Unknown setting",
            ErrorCode::SettingInvalid => "Invalid setting value",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Payment
            5001 => Ok(ErrorCode::PaymentPlatformError),
            5101 => Ok(ErrorCode::CouponCodeRequired),
            5102 => Ok(ErrorCode::CouponDiscountInvalid),
            5103 => Ok(ErrorCode::CouponTargetMissing),
            5104 => Ok(ErrorCode::CouponNoProducts),
            5105 => Ok(ErrorCode::CouponTargetMismatch),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),

            // Settings
            7001 => Ok(ErrorCode::SettingNotFound),
            7002 => Ok(ErrorCode::SettingInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::CouponCodeRequired.code(), 5101);
        assert_eq!(ErrorCode::CategoryNotFound.code(), 6101);
        assert_eq!(ErrorCode::SettingInvalid.code(), 7002);
        assert_eq!(ErrorCode::TimeoutError.code(), 9004);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(5102), Ok(ErrorCode::CouponDiscountInvalid));
        assert_eq!(ErrorCode::try_from(7001), Ok(ErrorCode::SettingNotFound));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::CouponTargetMissing).unwrap();
        assert_eq!(json, "5103");
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("65000");
        assert!(result.is_err());
    }

    #[test]
    fn test_every_code_roundtrips() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::PaymentPlatformError,
            ErrorCode::CouponCodeRequired,
            ErrorCode::CouponDiscountInvalid,
            ErrorCode::CouponTargetMissing,
            ErrorCode::CouponNoProducts,
            ErrorCode::CouponTargetMismatch,
            ErrorCode::ProductNotFound,
            ErrorCode::ProductInvalidPrice,
            ErrorCode::CategoryNotFound,
            ErrorCode::SettingNotFound,
            ErrorCode::SettingInvalid,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
            assert!(!code.message().is_empty());
        }
    }
}
