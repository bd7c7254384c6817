//! Stripe integration via REST API (no SDK dependency)
//!
//! [`StripeClient`] implements both platform traits:
//! - [`coupons`]: coupons and promotion codes
//! - [`products`]: product mirror and prices

mod coupons;
mod products;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::platform::PlatformError;

/// Stripe error code for a missing object
const RESOURCE_MISSING: &str = "resource_missing";

#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
    timeout: Duration,
}

impl StripeClient {
    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Http(e.to_string()))?;
        Ok(Self {
            http,
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PlatformError> {
        Self::new(
            config.stripe_secret_key.clone(),
            config.stripe_api_base.clone(),
            config.stripe_timeout,
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/v1/{path}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
    }

    /// Send and decode, mapping Stripe error bodies to [`PlatformError`]
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, PlatformError> {
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let resp = check_status(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> PlatformError {
        if e.is_timeout() {
            PlatformError::Timeout(self.timeout)
        } else {
            PlatformError::Http(e.to_string())
        }
    }
}

async fn check_status(resp: Response) -> Result<Response, PlatformError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    Err(api_error(status.as_u16(), &body))
}

/// Map a non-2xx Stripe response body to a platform error
fn api_error(status: u16, body: &Value) -> PlatformError {
    let error = &body["error"];
    let message = error["message"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {status}"));

    if status == 404 || error["code"].as_str() == Some(RESOURCE_MISSING) {
        PlatformError::NotFound(message)
    } else {
        PlatformError::Api { status, message }
    }
}

/// One page of a Stripe list endpoint
#[derive(Debug, serde::Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}
