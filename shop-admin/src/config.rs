//! Service configuration

use std::time::Duration;

use shared::error::AppError;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Environment: development | staging | production
    pub environment: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe REST base URL (overridable for stripe-mock)
    pub stripe_api_base: String,
    /// Per-call timeout for payment-platform requests
    pub stripe_timeout: Duration,
    /// Coupons synchronized at once (1 = strictly sequential)
    pub coupon_sync_concurrency: usize,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, AppError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(AppError::config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(AppError::config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| AppError::config("DATABASE_URL must be set"))?,
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.stripe.com".into()),
            stripe_timeout: Duration::from_secs(
                std::env::var("STRIPE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(10),
            ),
            coupon_sync_concurrency: std::env::var("COUPON_SYNC_CONCURRENCY")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1),
            environment,
        })
    }
}
