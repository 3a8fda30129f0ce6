use thiserror::Error;

/// 错误信息中允许出现的上游响应体最大字符数
pub const EXCERPT_LIMIT: usize = 100;

/// 网关错误的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Config,
    Auth,
    Endpoint,
    RateLimit,
    Upstream,
    Schema,
    Parse,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Validation,
        ErrorKind::Config,
        ErrorKind::Auth,
        ErrorKind::Endpoint,
        ErrorKind::RateLimit,
        ErrorKind::Upstream,
        ErrorKind::Schema,
        ErrorKind::Parse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::Endpoint => "EndpointError",
            ErrorKind::RateLimit => "RateLimitError",
            ErrorKind::Upstream => "UpstreamError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Parse => "ParseError",
        }
    }

    /// 对外响应使用的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Config | ErrorKind::Parse => 500,
            ErrorKind::Auth
            | ErrorKind::Endpoint
            | ErrorKind::RateLimit
            | ErrorKind::Upstream
            | ErrorKind::Schema => 502,
        }
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("缺少必要的参数: {0}")]
    ValidationError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("上游服务鉴权失败 ({status}): {excerpt}")]
    AuthError { status: u16, excerpt: String },

    #[error("上游服务地址无效 ({status}): {excerpt}")]
    EndpointError { status: u16, excerpt: String },

    #[error("上游服务请求过于频繁 ({status}): {excerpt}")]
    RateLimitError { status: u16, excerpt: String },

    #[error("上游服务报错 ({status}): {excerpt}")]
    UpstreamError { status: u16, excerpt: String },

    #[error("上游服务返回的数据格式异常: {0}")]
    SchemaError(String),

    #[error("AI 生成的内容无法解析为 JSON: {0}")]
    ParseError(String),
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GatewayError::ValidationError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        GatewayError::ConfigError(msg.into())
    }

    /// 细节可能带有上游内容，同样截断
    pub fn schema(msg: impl Into<String>) -> Self {
        GatewayError::SchemaError(excerpt(&msg.into()))
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        GatewayError::ParseError(excerpt(&msg.into()))
    }

    /// 按上游 HTTP 状态码分类，响应体只保留截断后的摘要。
    /// 调用方需先用 [`redact`] 遮盖密钥，否则截断点可能把密钥切成半截留下前缀
    pub fn from_upstream_status(status: u16, body: &str) -> Self {
        let excerpt = excerpt(body);
        match status {
            401 => GatewayError::AuthError { status, excerpt },
            404 => GatewayError::EndpointError { status, excerpt },
            429 => GatewayError::RateLimitError { status, excerpt },
            _ => GatewayError::UpstreamError { status, excerpt },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::ValidationError(_) => ErrorKind::Validation,
            GatewayError::ConfigError(_) => ErrorKind::Config,
            GatewayError::AuthError { .. } => ErrorKind::Auth,
            GatewayError::EndpointError { .. } => ErrorKind::Endpoint,
            GatewayError::RateLimitError { .. } => ErrorKind::RateLimit,
            GatewayError::UpstreamError { .. } => ErrorKind::Upstream,
            GatewayError::SchemaError(_) => ErrorKind::Schema,
            GatewayError::ParseError(_) => ErrorKind::Parse,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    /// 传输层失败或上游 5xx，可以安全地重试一次
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::UpstreamError { status, .. } => *status == 0 || *status >= 500,
            _ => false,
        }
    }

    /// 生成对外可见的错误信息，其中出现的密钥会被遮盖
    pub fn public_message(&self, secret: Option<&str>) -> String {
        let message = self.to_string();
        match secret {
            Some(secret) if !secret.is_empty() => message.replace(secret, "***"),
            _ => message,
        }
    }
}

/// 连接失败、超时等没有状态码的错误统一记为 status 0
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
        let detail = if err.is_timeout() {
            "请求超时".to_string()
        } else if err.is_connect() {
            "无法连接上游服务".to_string()
        } else {
            err.without_url().to_string()
        };
        GatewayError::UpstreamError {
            status,
            excerpt: excerpt(&detail),
        }
    }
}

/// 把文本中出现的密钥替换为 ***
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "***")
    }
}

/// 截断到 EXCERPT_LIMIT 个字符，超出部分以 "..." 结尾
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(EXCERPT_LIMIT).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
