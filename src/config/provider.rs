use super::{Config, ProviderKind};
use crate::error::GatewayError;
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const API_KEY_VAR: &str = "API_KEY";
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// 环境变量来源，测试中可以替换为内存实现
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// 进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// 基于 HashMap 的环境变量
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// 单次请求使用的上游配置
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub provider_kind: ProviderKind,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("provider_kind", &self.provider_kind)
            .finish()
    }
}

/// 每次请求都重新读取环境，不做缓存
#[derive(Clone)]
pub struct ConfigProvider {
    env: Arc<dyn EnvSource>,
    kind: ProviderKind,
    structured_endpoint: String,
}

impl ConfigProvider {
    pub fn new(env: Arc<dyn EnvSource>, config: &Config) -> Self {
        Self {
            env,
            kind: config.provider,
            structured_endpoint: config.structured_endpoint.clone(),
        }
    }

    pub fn from_process_env(config: &Config) -> Self {
        Self::new(Arc::new(ProcessEnv), config)
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn resolve(&self) -> Result<ProviderConfig> {
        let api_key = self
            .env
            .var(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .unwrap_or_default();
        if api_key.is_empty() {
            return Err(GatewayError::config("服务器缺少 API_KEY"));
        }

        // 结构化输出走固定端点，忽略 API_BASE_URL
        let base_url = match self.kind {
            ProviderKind::RestChat => {
                let raw = self.env.var(API_BASE_URL_VAR).unwrap_or_default();
                normalize_base_url(raw.trim())
            }
            ProviderKind::StructuredOutput => {
                self.structured_endpoint.trim().trim_end_matches('/').to_string()
            }
        };

        Ok(ProviderConfig {
            api_key,
            base_url,
            provider_kind: self.kind,
        })
    }
}

/// 规范化 REST 接口的 base URL，结果总是以 /v1 结尾
pub fn normalize_base_url(url: &str) -> String {
    if url.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    let url = url.strip_suffix('/').unwrap_or(url);
    if url.ends_with("/v1") {
        url.to_string()
    } else {
        format!("{}/v1", url)
    }
}
