use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// 支付提供商配置
/// mode: "live" 使用真实 API, "simulated" 使用模拟适配器（开发/演示环境）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_provider_mode")]
    pub mode: String,
    /// 单次外部调用超时（秒），超时按传输失败处理
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
    #[serde(default)]
    pub chime: ChimeConfig,
    #[serde(default)]
    pub paypal: PaypalConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    /// simulated 模式下的成功率 (0.0 ~ 1.0)
    #[serde(default = "default_simulated_rate")]
    pub simulated_success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    pub api_key: String,
    #[serde(default = "default_chime_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaypalConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_paypal_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    pub secret_key: String,
}

/// 批处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// processBatch 内部单项派发的并发上限
    pub concurrency: usize,
    /// 后台打款扫描间隔（秒），0 表示不启动
    pub sweep_interval_secs: u64,
    /// 单次扫描最多认领的 pending 打款数
    pub sweep_page_size: u64,
    /// 后台开奖扫描间隔（秒），0 表示不启动
    pub draw_sweep_interval_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            sweep_interval_secs: 0,
            sweep_page_size: 50,
            draw_sweep_interval_secs: 0,
        }
    }
}

/// 通知回调配置（尽力而为，失败只记日志）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_provider_mode() -> String {
    "simulated".to_string()
}

fn default_send_timeout() -> u64 {
    30
}

fn default_simulated_rate() -> f64 {
    0.9
}

fn default_chime_base_url() -> String {
    "https://api.chime.com/v1".to_string()
}

fn default_paypal_base_url() -> String {
    "https://api-m.paypal.com".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    providers: ProvidersConfig {
                        mode: get_env("PROVIDERS_MODE").unwrap_or_else(default_provider_mode),
                        send_timeout_secs: get_env_parse(
                            "PROVIDERS_SEND_TIMEOUT_SECS",
                            default_send_timeout(),
                        ),
                        chime: ChimeConfig {
                            api_key: get_env("CHIME_API_KEY").unwrap_or_default(),
                            base_url: get_env("CHIME_BASE_URL")
                                .unwrap_or_else(default_chime_base_url),
                        },
                        paypal: PaypalConfig {
                            client_id: get_env("PAYPAL_CLIENT_ID").unwrap_or_default(),
                            client_secret: get_env("PAYPAL_CLIENT_SECRET").unwrap_or_default(),
                            base_url: get_env("PAYPAL_BASE_URL")
                                .unwrap_or_else(default_paypal_base_url),
                        },
                        stripe: StripeConfig {
                            secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                        },
                        simulated_success_rate: get_env_parse(
                            "PROVIDERS_SIMULATED_SUCCESS_RATE",
                            default_simulated_rate(),
                        ),
                    },
                    batch: BatchConfig {
                        concurrency: get_env_parse("BATCH_CONCURRENCY", 4usize),
                        sweep_interval_secs: get_env_parse("BATCH_SWEEP_INTERVAL_SECS", 0u64),
                        sweep_page_size: get_env_parse("BATCH_SWEEP_PAGE_SIZE", 50u64),
                        draw_sweep_interval_secs: get_env_parse(
                            "DRAW_SWEEP_INTERVAL_SECS",
                            0u64,
                        ),
                    },
                    notify: NotifyConfig {
                        webhook_url: get_env("NOTIFY_WEBHOOK_URL"),
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("PROVIDERS_MODE") {
            config.providers.mode = v;
        }
        if let Ok(v) = env::var("PROVIDERS_SEND_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.providers.send_timeout_secs = n;
        }
        if let Ok(v) = env::var("PROVIDERS_SIMULATED_SUCCESS_RATE")
            && let Ok(n) = v.parse()
        {
            config.providers.simulated_success_rate = n;
        }
        if let Ok(v) = env::var("CHIME_API_KEY") {
            config.providers.chime.api_key = v;
        }
        if let Ok(v) = env::var("CHIME_BASE_URL") {
            config.providers.chime.base_url = v;
        }
        if let Ok(v) = env::var("PAYPAL_CLIENT_ID") {
            config.providers.paypal.client_id = v;
        }
        if let Ok(v) = env::var("PAYPAL_CLIENT_SECRET") {
            config.providers.paypal.client_secret = v;
        }
        if let Ok(v) = env::var("PAYPAL_BASE_URL") {
            config.providers.paypal.base_url = v;
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            config.providers.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("BATCH_CONCURRENCY")
            && let Ok(n) = v.parse()
        {
            config.batch.concurrency = n;
        }
        if let Ok(v) = env::var("BATCH_SWEEP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.batch.sweep_interval_secs = n;
        }
        if let Ok(v) = env::var("BATCH_SWEEP_PAGE_SIZE")
            && let Ok(n) = v.parse()
        {
            config.batch.sweep_page_size = n;
        }
        if let Ok(v) = env::var("DRAW_SWEEP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            config.batch.draw_sweep_interval_secs = n;
        }
        if let Ok(v) = env::var("NOTIFY_WEBHOOK_URL") {
            config.notify.webhook_url = Some(v);
        }

        Ok(config)
    }
}
