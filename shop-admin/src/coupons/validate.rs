//! Coupon specification validation
//!
//! Runs before any platform call; the first violation rejects the whole batch.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{ApplyTo, ApplyToKind, CouponMap, CouponSpec, Discount, RawCouponSpec};

/// Codes are matched case-insensitively; the platform sees them uppercase
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate every coupon, keyed by normalized code.
///
/// Entries are scanned in key order. Two entries whose codes collide after
/// normalization are rejected as duplicates.
pub fn validate_coupons(desired: &CouponMap) -> Result<BTreeMap<String, CouponSpec>, AppError> {
    let mut specs = BTreeMap::new();
    for (key, raw) in desired {
        let spec = validate_coupon(key, raw)?;
        if specs.contains_key(&spec.code) {
            return Err(AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("Duplicate coupon code {}", spec.code),
            )
            .with_detail("coupon", key.as_str()));
        }
        specs.insert(spec.code.clone(), spec);
    }
    Ok(specs)
}

/// Validate one coupon; `key` is its entry name, used in error details
pub fn validate_coupon(key: &str, raw: &RawCouponSpec) -> Result<CouponSpec, AppError> {
    let code = normalize_code(&raw.code);
    if code.is_empty() {
        return Err(AppError::new(ErrorCode::CouponCodeRequired).with_detail("coupon", key));
    }

    let discount = match (raw.percent_off, raw.amount_off) {
        (Some(percent), None) => {
            if !(percent > 0.0 && percent <= 100.0) {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("Coupon {code}: percent off must be in (0, 100], got {percent}"),
                )
                .with_detail("coupon", key)
                .with_detail("field", "percentOff"));
            }
            Discount::PercentOff(percent)
        }
        (None, Some(amount)) => {
            if amount <= Decimal::ZERO {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("Coupon {code}: amount off must be positive, got {amount}"),
                )
                .with_detail("coupon", key)
                .with_detail("field", "amountOff"));
            }
            Discount::AmountOff(amount)
        }
        _ => {
            return Err(AppError::new(ErrorCode::CouponDiscountInvalid).with_detail("coupon", key));
        }
    };

    let apply_to = match raw.apply_to {
        ApplyToKind::All => {
            unused_target(key, raw.product.as_deref(), "product")?;
            unused_target(key, raw.category.as_deref(), "category")?;
            ApplyTo::All
        }
        ApplyToKind::Product => {
            unused_target(key, raw.category.as_deref(), "category")?;
            ApplyTo::Product(target(key, raw.product.as_deref(), "product")?)
        }
        ApplyToKind::Category => {
            unused_target(key, raw.product.as_deref(), "product")?;
            ApplyTo::Category(target(key, raw.category.as_deref(), "category")?)
        }
    };

    Ok(CouponSpec {
        code,
        discount,
        apply_to,
    })
}

fn target(key: &str, id: Option<&str>, field: &str) -> Result<String, AppError> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            AppError::new(ErrorCode::CouponTargetMissing)
                .with_detail("coupon", key)
                .with_detail("field", field)
        })
}

/// A target the scope ignores must be blank
fn unused_target(key: &str, id: Option<&str>, field: &str) -> Result<(), AppError> {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        None => Ok(()),
        Some(_) => Err(AppError::new(ErrorCode::CouponTargetMismatch)
            .with_detail("coupon", key)
            .with_detail("field", field)),
    }
}
