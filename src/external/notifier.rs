use reqwest::Client;
use serde_json::json;

use crate::config::NotifyConfig;
use crate::entities::PayoutStatus;

/// 打款结果通知（尽力而为）
/// 通知失败绝不改变打款本身的终态，只记日志
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn notify_payout_result(
        &self,
        payout_id: i64,
        user_id: i64,
        status: PayoutStatus,
        detail: Option<&str>,
    ) {
        let Some(url) = self.config.webhook_url.as_deref() else {
            log::debug!("payout {payout_id} for user {user_id} -> {status} (no webhook configured)");
            return;
        };

        let event = match status {
            PayoutStatus::Paid => "payout.completed",
            PayoutStatus::Failed => "payout.failed",
            _ => return,
        };

        let result = self
            .client
            .post(url)
            .json(&json!({
                "event": event,
                "payout_id": payout_id,
                "user_id": user_id,
                "detail": detail,
            }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                log::warn!("payout notification for {payout_id} got {}", resp.status());
            }
            Err(e) => {
                log::warn!("payout notification for {payout_id} failed: {e}");
            }
        }
    }
}
