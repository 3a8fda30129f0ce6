pub mod prompt;
pub mod rest_chat;
pub mod structured;

pub use rest_chat::RestChatAdapter;
pub use structured::StructuredOutputAdapter;

use crate::config::{Config, ProviderConfig, ProviderKind};
use crate::error::{excerpt, redact, GatewayError};
use crate::types::BirthInput;
use crate::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// 单次调用的超时，对应平台 60 秒的执行上限
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// 开启 retry_once 时两次尝试之间的等待
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// 获取全局 HTTP 客户端（连接池复用）
fn get_http_client() -> &'static Client {
    static CLIENT: Lazy<Client> = Lazy::new(|| {
        Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| Client::new())
    });
    &CLIENT
}

/// 读取错误响应体，只保留前 4096 个字符；先遮盖密钥，再记录和截断
async fn read_error_body(response: reqwest::Response, secret: &str) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(4096)
        .collect::<String>();
    let body = redact(&body, secret);
    warn!("上游返回错误响应: {}", excerpt(&body));
    body
}

/// 上游适配器：构造请求、调用上游、返回原始文本
#[allow(async_fn_in_trait)]
pub trait ProviderAdapter {
    async fn generate(&self, config: &ProviderConfig, input: &BirthInput) -> Result<String>;
}

/// 部署时选定的适配器
#[derive(Debug, Clone)]
pub enum Adapter {
    RestChat(RestChatAdapter),
    StructuredOutput(StructuredOutputAdapter),
}

impl Adapter {
    pub fn from_config(config: &Config) -> Self {
        let model = config.model_name();
        match config.provider {
            ProviderKind::RestChat => {
                Adapter::RestChat(RestChatAdapter::new(model, config.temperature))
            }
            ProviderKind::StructuredOutput => {
                Adapter::StructuredOutput(StructuredOutputAdapter::new(model, config.temperature))
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Adapter::RestChat(_) => ProviderKind::RestChat,
            Adapter::StructuredOutput(_) => ProviderKind::StructuredOutput,
        }
    }

    /// 可选的单次重试，只针对传输失败和上游 5xx
    pub async fn generate_with_retry(
        &self,
        config: &ProviderConfig,
        input: &BirthInput,
        retry_once: bool,
    ) -> Result<String> {
        match self.generate(config, input).await {
            Err(e) if retry_once && e.is_transient() => {
                warn!("上游调用失败，{}ms 后重试一次: {}", RETRY_DELAY.as_millis(), e);
                tokio::time::sleep(RETRY_DELAY).await;
                self.generate(config, input).await
            }
            other => other,
        }
    }
}

impl ProviderAdapter for Adapter {
    async fn generate(&self, config: &ProviderConfig, input: &BirthInput) -> Result<String> {
        debug!("使用适配器: {}", self.kind().as_str());
        if config.provider_kind != self.kind() {
            return Err(GatewayError::config(format!(
                "适配器 {} 与配置 {} 不一致",
                self.kind().as_str(),
                config.provider_kind.as_str()
            )));
        }
        match self {
            Adapter::RestChat(adapter) => adapter.generate(config, input).await,
            Adapter::StructuredOutput(adapter) => adapter.generate(config, input).await,
        }
    }
}
