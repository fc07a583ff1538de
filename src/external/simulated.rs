use async_trait::async_trait;
use rand::Rng;
use uuid::Uuid;

use crate::external::{PayoutAdapter, ProviderError};

/// 模拟适配器（开发/演示环境）: 按配置的成功率随机成功或失败
/// 随机行为只存在于这里，核心处理逻辑的测试使用确定性 mock
#[derive(Clone)]
pub struct SimulatedAdapter {
    success_rate: f64,
}

impl SimulatedAdapter {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl PayoutAdapter for SimulatedAdapter {
    async fn send(&self, amount_cents: i64, destination: &str) -> Result<String, ProviderError> {
        let roll: f64 = rand::thread_rng().r#gen();
        if roll < self.success_rate {
            log::debug!("simulated payout of {amount_cents} cents to {destination}");
            Ok(format!("sim_{}", Uuid::new_v4().simple()))
        } else {
            Err(ProviderError::Unavailable(
                "simulated transport failure".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds_at_rate_one() {
        let adapter = SimulatedAdapter::new(1.0);
        for _ in 0..50 {
            let result = adapter.send(100, "dest").await;
            assert!(result.is_ok());
            assert!(result.unwrap().starts_with("sim_"));
        }
    }

    #[tokio::test]
    async fn test_always_fails_at_rate_zero() {
        let adapter = SimulatedAdapter::new(0.0);
        for _ in 0..50 {
            let result = adapter.send(100, "dest").await;
            assert_eq!(
                result,
                Err(ProviderError::Unavailable(
                    "simulated transport failure".to_string()
                ))
            );
        }
    }
}
