use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use shared::models::{ExternalCoupon, NewCoupon, PromotionCode};

use super::{ListPage, StripeClient};
use crate::platform::{CouponPlatform, PlatformError};

const PAGE_SIZE: &str = "100";

#[async_trait]
impl CouponPlatform for StripeClient {
    async fn list_coupons(&self) -> Result<Vec<ExternalCoupon>, PlatformError> {
        let mut coupons = Vec::new();
        let mut starting_after: Option<String> = None;
        loop {
            let mut query = vec![("limit", PAGE_SIZE.to_string())];
            if let Some(after) = &starting_after {
                query.push(("starting_after", after.clone()));
            }
            let page: ListPage<ExternalCoupon> = self
                .send(self.request(Method::GET, "coupons").query(&query))
                .await?;
            starting_after = page.data.last().map(|c| c.id.clone());
            coupons.extend(page.data);
            if !page.has_more || starting_after.is_none() {
                break;
            }
        }
        tracing::debug!(count = coupons.len(), "Listed Stripe coupons");
        Ok(coupons)
    }

    async fn create_coupon(&self, coupon: &NewCoupon) -> Result<ExternalCoupon, PlatformError> {
        self.send(self.request(Method::POST, "coupons").form(&coupon_form(coupon)))
            .await
    }

    async fn delete_coupon(&self, id: &str) -> Result<(), PlatformError> {
        let _: Value = self
            .send(self.request(Method::DELETE, &format!("coupons/{id}")))
            .await?;
        Ok(())
    }

    async fn create_promotion_code(
        &self,
        coupon_id: &str,
        code: &str,
    ) -> Result<PromotionCode, PlatformError> {
        self.send(
            self.request(Method::POST, "promotion_codes")
                .form(&[("coupon", coupon_id), ("code", code)]),
        )
        .await
    }
}

/// Form fields for `POST /v1/coupons`
fn coupon_form(coupon: &NewCoupon) -> Vec<(String, String)> {
    let mut form = vec![("name".to_string(), coupon.name.clone())];
    if let Some(percent) = coupon.percent_off {
        form.push(("percent_off".into(), percent.to_string()));
    }
    if let Some(amount) = coupon.amount_off {
        form.push(("amount_off".into(), amount.to_string()));
    }
    if let Some(currency) = &coupon.currency {
        form.push(("currency".into(), currency.clone()));
    }
    for (i, product) in coupon.applies_to_products.iter().enumerate() {
        form.push((format!("applies_to[products][{i}]"), product.clone()));
    }
    form
}
