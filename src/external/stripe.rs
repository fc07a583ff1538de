use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::external::{PayoutAdapter, ProviderError};

#[derive(Debug, Deserialize)]
struct StripeTransfer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe Connect 转账适配器: destination 为已绑定的 connected account ID (acct_...)
#[derive(Clone)]
pub struct StripeAdapter {
    client: Client,
    config: StripeConfig,
}

impl StripeAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PayoutAdapter for StripeAdapter {
    async fn send(&self, amount_cents: i64, destination: &str) -> Result<String, ProviderError> {
        let url = "https://api.stripe.com/v1/transfers";

        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("destination", destination.to_string()),
        ];

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("stripe request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let transfer: StripeTransfer = response
                .json()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("stripe bad response: {e}")))?;
            return Ok(transfer.id);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or(body);

        // 4xx 代表请求/账户本身被拒，5xx 代表服务不可用可重试
        if status.is_client_error() {
            Err(ProviderError::Rejected(format!("stripe: {message}")))
        } else {
            Err(ProviderError::Unavailable(format!(
                "stripe {status}: {message}"
            )))
        }
    }
}
