use async_trait::async_trait;
use reqwest::Method;
use shared::models::{PlatformPrice, PlatformProduct};

use super::StripeClient;
use crate::platform::{CatalogPlatform, PlatformError};

#[async_trait]
impl CatalogPlatform for StripeClient {
    async fn retrieve_product(&self, id: &str) -> Result<PlatformProduct, PlatformError> {
        self.send(self.request(Method::GET, &format!("products/{id}")))
            .await
    }

    async fn create_product(&self, id: &str, name: &str) -> Result<PlatformProduct, PlatformError> {
        self.send(
            self.request(Method::POST, "products")
                .form(&[("id", id), ("name", name)]),
        )
        .await
    }

    async fn rename_product(&self, id: &str, name: &str) -> Result<(), PlatformError> {
        let _: PlatformProduct = self
            .send(
                self.request(Method::POST, &format!("products/{id}"))
                    .form(&[("name", name)]),
            )
            .await?;
        Ok(())
    }

    async fn deactivate_product(&self, id: &str) -> Result<(), PlatformError> {
        let _: PlatformProduct = self
            .send(
                self.request(Method::POST, &format!("products/{id}"))
                    .form(&[("active", "false")]),
            )
            .await?;
        Ok(())
    }

    async fn create_price(
        &self,
        product_id: &str,
        unit_amount: i64,
        currency: &str,
    ) -> Result<PlatformPrice, PlatformError> {
        let unit_amount = unit_amount.to_string();
        self.send(self.request(Method::POST, "prices").form(&[
            ("product", product_id),
            ("unit_amount", unit_amount.as_str()),
            ("currency", currency),
        ]))
        .await
    }
}
