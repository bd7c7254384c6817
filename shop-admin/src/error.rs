//! Unified service-layer error type
//!
//! `ServiceError` bridges infrastructure errors (`sqlx::Error`, `BoxError`)
//! and the business error (`AppError`), so store and platform code can use `?`
//! without manual `.map_err(...)` at every call site.

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::platform::PlatformError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error, only two variants.
///
/// - `Db`: Database/infrastructure errors (logged, mapped to DatabaseError)
/// - `App`: Business-rule errors (passed through unchanged)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, serde, etc.)
    #[error("{0}")]
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    #[error(transparent)]
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<sqlx::migrate::MigrateError> for ServiceError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<PlatformError> for ServiceError {
    fn from(e: PlatformError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
