use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;

/// Capability interface over the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway order for the given amount in the smallest
    /// currency unit, tagged with the receipt and audit notes.
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Razorpay orders API client. Authenticates with basic auth over the
/// key id / key secret pair.
pub struct RazorpayGateway {
    client: Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

impl RazorpayGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
            base_url: config.razorpay_base_url.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder> {
        let url = format!("{}/v1/orders", self.base_url);
        debug!("Creating gateway order for {} {} at {}", amount, currency, url);

        let body = json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
            "notes": notes,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gateway order creation failed ({}): {}", status, error_text);
            return Err(anyhow!("Gateway error ({}): {}", status, error_text));
        }

        let order: GatewayOrder = response.json().await?;
        info!("Created gateway order {}", order.id);
        Ok(order)
    }
}
