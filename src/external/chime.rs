use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ChimeConfig;
use crate::external::{PayoutAdapter, ProviderError};

#[derive(Debug, Deserialize)]
struct ChimeTransfer {
    transfer_id: String,
}

/// Chime 合作方转账适配器: destination 为用户的 $ChimeSign 标签
#[derive(Clone)]
pub struct ChimeAdapter {
    client: Client,
    config: ChimeConfig,
}

impl ChimeAdapter {
    pub fn new(config: ChimeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PayoutAdapter for ChimeAdapter {
    async fn send(&self, amount_cents: i64, destination: &str) -> Result<String, ProviderError> {
        let url = format!("{}/transfers", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "amount_cents": amount_cents,
                "currency": "USD",
                "recipient_tag": destination,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("chime request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let transfer: ChimeTransfer = response
                .json()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("chime bad response: {e}")))?;
            return Ok(transfer.transfer_id);
        }

        let text = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ProviderError::Rejected(format!("chime: {text}")))
        } else {
            Err(ProviderError::Unavailable(format!("chime {status}: {text}")))
        }
    }
}
