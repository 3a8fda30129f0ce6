use crate::config::{Config, ConfigProvider, ProviderKind};
use crate::extract::extract;
use crate::providers::Adapter;
use crate::schema;
use crate::types::{BirthInput, NormalizedResult};
use crate::Result;
use tracing::{error, info};

/// 生成请求的完整流程：校验 → 读取配置 → 调用上游 → 提取 JSON → 校验结构
#[derive(Clone)]
pub struct Gateway {
    config_provider: ConfigProvider,
    adapter: Adapter,
    retry_once: bool,
}

/// 一次生成的结果，失败时附带应当遮盖的密钥
pub struct Outcome {
    pub result: Result<NormalizedResult>,
    pub secret: Option<String>,
}

impl Outcome {
    /// 对外可见的错误信息
    pub fn error_message(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .map(|e| e.public_message(self.secret.as_deref()))
    }
}

impl Gateway {
    pub fn new(config: &Config, config_provider: ConfigProvider) -> Self {
        Self {
            config_provider,
            adapter: Adapter::from_config(config),
            retry_once: config.retry_once,
        }
    }

    pub fn from_process_env(config: &Config) -> Self {
        Self::new(config, ConfigProvider::from_process_env(config))
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.adapter.kind()
    }

    /// 处理一个请求体
    pub async fn generate(&self, body: &[u8]) -> Outcome {
        let mut secret = None;
        let result = self.run(body, &mut secret).await;

        if let Err(e) = &result {
            error!(
                kind = e.kind().as_str(),
                status = e.http_status(),
                "生成失败: {}",
                e.public_message(secret.as_deref())
            );
        }

        Outcome { result, secret }
    }

    async fn run(&self, body: &[u8], secret: &mut Option<String>) -> Result<NormalizedResult> {
        let input = BirthInput::from_body(body)?;
        info!("处理请求: {}", input.birth_place);

        let provider_config = self.config_provider.resolve()?;
        *secret = Some(provider_config.api_key.clone());

        let text = self
            .adapter
            .generate_with_retry(&provider_config, &input, self.retry_once)
            .await?;

        let value = extract(&text)?;
        let result = schema::validate(value)?;

        info!("生成成功: {} 个推荐城市", result.recommendations.len());
        Ok(result)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("adapter", &self.adapter)
            .field("retry_once", &self.retry_once)
            .finish()
    }
}
