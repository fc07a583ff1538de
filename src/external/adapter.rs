use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProvidersConfig;
use crate::entities::PayoutMethod;
use crate::external::{ChimeAdapter, PaypalAdapter, SimulatedAdapter, StripeAdapter};

/// 提供商侧失败的分类
/// - Rejected: 收款方被拒（账户无效/风控拒付），该笔为终态，需用户修复账户后再重新入批
/// - Unavailable: 传输层失败（超时/5xx/网络），重新入批即可重试
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    Rejected(String),
    Unavailable(String),
}

impl ProviderError {
    pub fn retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            ProviderError::Rejected(msg) | ProviderError::Unavailable(msg) => msg,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Rejected(msg) => write!(f, "rejected by provider: {msg}"),
            ProviderError::Unavailable(msg) => write!(f, "provider unavailable: {msg}"),
        }
    }
}

/// 打款通道适配器
/// 成功返回提供商侧交易ID，真实网络调用的细节（认证、重定向等）由各实现自理
#[async_trait]
pub trait PayoutAdapter: Send + Sync {
    async fn send(&self, amount_cents: i64, destination: &str) -> Result<String, ProviderError>;
}

/// 按通道路由到对应适配器
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Arc<HashMap<PayoutMethod, Arc<dyn PayoutAdapter>>>,
}

impl AdapterRegistry {
    pub fn new(adapters: HashMap<PayoutMethod, Arc<dyn PayoutAdapter>>) -> Self {
        Self {
            adapters: Arc::new(adapters),
        }
    }

    /// 根据配置组装: live 模式使用真实适配器，simulated 模式全部走模拟适配器
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut adapters: HashMap<PayoutMethod, Arc<dyn PayoutAdapter>> = HashMap::new();

        if config.mode == "live" {
            adapters.insert(
                PayoutMethod::Chime,
                Arc::new(ChimeAdapter::new(config.chime.clone())),
            );
            adapters.insert(
                PayoutMethod::Paypal,
                Arc::new(PaypalAdapter::new(config.paypal.clone())),
            );
            adapters.insert(
                PayoutMethod::Stripe,
                Arc::new(StripeAdapter::new(config.stripe.clone())),
            );
        } else {
            let simulated = Arc::new(SimulatedAdapter::new(config.simulated_success_rate));
            adapters.insert(PayoutMethod::Chime, simulated.clone());
            adapters.insert(PayoutMethod::Paypal, simulated.clone());
            adapters.insert(PayoutMethod::Stripe, simulated);
        }

        Self::new(adapters)
    }

    pub fn get(&self, method: PayoutMethod) -> Option<Arc<dyn PayoutAdapter>> {
        self.adapters.get(&method).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChimeConfig, PaypalConfig, ProvidersConfig, StripeConfig};

    fn simulated_config() -> ProvidersConfig {
        ProvidersConfig {
            mode: "simulated".to_string(),
            send_timeout_secs: 30,
            chime: ChimeConfig::default(),
            paypal: PaypalConfig::default(),
            stripe: StripeConfig::default(),
            simulated_success_rate: 1.0,
        }
    }

    #[test]
    fn test_provider_error_classification() {
        assert!(ProviderError::Unavailable("timeout".into()).retryable());
        assert!(!ProviderError::Rejected("invalid account".into()).retryable());
    }

    #[test]
    fn test_registry_covers_all_methods_in_simulated_mode() {
        let registry = AdapterRegistry::from_config(&simulated_config());
        assert!(registry.get(PayoutMethod::Chime).is_some());
        assert!(registry.get(PayoutMethod::Paypal).is_some());
        assert!(registry.get(PayoutMethod::Stripe).is_some());
    }
}
