use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::PaypalConfig;
use crate::external::{PayoutAdapter, ProviderError};

#[derive(Debug, Deserialize)]
struct OAuthToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PayoutBatchHeader {
    payout_batch_id: String,
}

#[derive(Debug, Deserialize)]
struct PayoutCreated {
    batch_header: PayoutBatchHeader,
}

/// PayPal Payouts 适配器: destination 为收款方邮箱
#[derive(Clone)]
pub struct PaypalAdapter {
    client: Client,
    config: PaypalConfig,
}

impl PaypalAdapter {
    pub fn new(config: PaypalConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// client_credentials 换取访问令牌（每次调用获取，调用频率低不值得缓存）
    async fn access_token(&self) -> Result<String, ProviderError> {
        let url = format!("{}/v1/oauth2/token", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("paypal oauth failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "paypal oauth {status}: {body}"
            )));
        }

        let token: OAuthToken = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("paypal oauth bad response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PayoutAdapter for PaypalAdapter {
    async fn send(&self, amount_cents: i64, destination: &str) -> Result<String, ProviderError> {
        let token = self.access_token().await?;
        let url = format!("{}/v1/payments/payouts", self.config.base_url);

        // sender_batch_id 作为幂等键，避免重放造成双付
        let body = json!({
            "sender_batch_header": {
                "sender_batch_id": Uuid::new_v4().to_string(),
                "email_subject": "You have a payout"
            },
            "items": [{
                "recipient_type": "EMAIL",
                "amount": {
                    "value": format!("{:.2}", amount_cents as f64 / 100.0),
                    "currency": "USD"
                },
                "receiver": destination
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("paypal request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let created: PayoutCreated = response
                .json()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("paypal bad response: {e}")))?;
            return Ok(created.batch_header.payout_batch_id);
        }

        let text = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ProviderError::Rejected(format!("paypal: {text}")))
        } else {
            Err(ProviderError::Unavailable(format!(
                "paypal {status}: {text}"
            )))
        }
    }
}
