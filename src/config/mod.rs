pub mod provider;

pub use provider::{
    normalize_base_url, ConfigProvider, EnvSource, MapEnv, ProcessEnv, ProviderConfig,
    API_BASE_URL_VAR, API_KEY_VAR, DEFAULT_BASE_URL,
};

use crate::error::GatewayError;
use crate::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_STRUCTURED_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// 上游适配器类型，每个部署只选择一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI 兼容的 /chat/completions 接口
    #[default]
    RestChat,
    /// Gemini 原生 generateContent + responseSchema
    StructuredOutput,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::RestChat => "rest_chat",
            ProviderKind::StructuredOutput => "structured_output",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::RestChat => "gemini-1.5-pro",
            ProviderKind::StructuredOutput => "gemini-2.5-flash",
        }
    }
}

/// 部署配置（不含密钥，密钥每次请求从环境读取）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderKind,
    /// 为空时使用对应 provider 的默认模型
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_structured_endpoint")]
    pub structured_endpoint: String,
    #[serde(default)]
    pub retry_once: bool,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_structured_endpoint() -> String {
    DEFAULT_STRUCTURED_ENDPOINT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: String::new(),
            temperature: default_temperature(),
            structured_endpoint: default_structured_endpoint(),
            retry_once: false,
        }
    }
}

impl Config {
    /// 从 YAML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GatewayError::config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::replace_env_vars(content)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::config(format!("YAML 解析错误: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 替换配置中的环境变量 ${VAR}
    fn replace_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| GatewayError::config(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name).map_err(|_| {
                GatewayError::config(format!("环境变量未找到: {}", var_name))
            })?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::config(format!(
                "temperature 必须在 0.0 到 2.0 之间，当前值: {}",
                self.temperature
            )));
        }

        if self.provider == ProviderKind::StructuredOutput
            && self.structured_endpoint.trim().is_empty()
        {
            return Err(GatewayError::config("structured_endpoint 不能为空"));
        }

        Ok(())
    }

    /// 实际使用的模型名
    pub fn model_name(&self) -> &str {
        if self.model.trim().is_empty() {
            self.provider.default_model()
        } else {
            self.model.trim()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, ProviderKind::RestChat);
        assert_eq!(config.model_name(), "gemini-1.5-pro");
        assert_eq!(config.temperature, 0.7);
        assert!(!config.retry_once);
    }

    #[test]
    fn test_config_from_valid_yaml() {
        let yaml = r#"
provider: structured_output
model: gemini-2.0-flash
temperature: 0.9
retry_once: true
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.provider, ProviderKind::StructuredOutput);
        assert_eq!(config.model_name(), "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.9);
        assert!(config.retry_once);
        assert_eq!(config.structured_endpoint, DEFAULT_STRUCTURED_ENDPOINT);
    }

    #[test]
    fn test_empty_model_falls_back_to_provider_default() {
        let config = Config::from_yaml("provider: structured_output\n").unwrap();
        assert_eq!(config.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_config_with_env_vars() {
        env::set_var("BAZIGATE_TEST_MODEL", "deepseek-chat");

        let config = Config::from_yaml("model: ${BAZIGATE_TEST_MODEL}\n").unwrap();
        assert_eq!(config.model_name(), "deepseek-chat");

        env::remove_var("BAZIGATE_TEST_MODEL");
    }

    #[test]
    fn test_config_missing_env_var() {
        let result = Config::from_yaml("model: ${BAZIGATE_MISSING_VAR}\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("BAZIGATE_MISSING_VAR"));
    }

    #[test]
    fn test_config_rejects_bad_temperature() {
        assert!(Config::from_yaml("temperature: 3.5\n").is_err());
    }

    #[test]
    fn test_config_rejects_unknown_provider() {
        assert!(Config::from_yaml("provider: anthropic\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }
}
