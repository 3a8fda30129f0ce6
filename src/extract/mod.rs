use crate::error::GatewayError;
use crate::Result;
use serde_json::Value;
use tracing::debug;

/// 提取策略，按顺序尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 原文直接解析
    Direct,
    /// 去掉 markdown 代码块围栏后解析
    FenceStripped,
}

pub const CHAIN: [Strategy; 2] = [Strategy::Direct, Strategy::FenceStripped];

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::FenceStripped => "fence_stripped",
        }
    }

    pub fn apply(&self, text: &str) -> std::result::Result<Value, serde_json::Error> {
        match self {
            Strategy::Direct => serde_json::from_str(text),
            Strategy::FenceStripped => serde_json::from_str(strip_fences(text)),
        }
    }
}

/// 去掉开头的 ```json / ``` 和结尾的 ```
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// 把上游文本解析成 JSON，不做其他修复
pub fn extract(text: &str) -> Result<Value> {
    let mut last_error = None;
    for strategy in CHAIN {
        match strategy.apply(text) {
            Ok(value) => {
                debug!("JSON 提取成功，策略: {}", strategy.name());
                return Ok(value);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(GatewayError::parse(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "空内容".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_json() {
        assert_eq!(extract("{\"a\":1}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_fenced_json() {
        assert_eq!(extract("```json\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
        assert_eq!(extract("```\n{\"a\":1}\n```").unwrap(), json!({"a": 1}));
        assert_eq!(extract("  \n```json\n{\"a\":1}\n```\n\n").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_only_leading_fence() {
        assert_eq!(extract("```json\n{\"a\":1}").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_failure() {
        let err = extract("not json").unwrap_err();
        assert!(matches!(err, GatewayError::ParseError(_)));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_no_repair_beyond_fences() {
        assert!(extract("{\"a\":1,}").is_err());
        assert!(extract("{\"a\":").is_err());
        assert!(extract("Here you go: {\"a\":1}").is_err());
    }

    #[test]
    fn test_strategies_independently() {
        let fenced = "```json\n{\"a\":1}\n```";
        assert!(Strategy::Direct.apply(fenced).is_err());
        assert!(Strategy::FenceStripped.apply(fenced).is_ok());
        assert!(Strategy::FenceStripped.apply("{\"a\":1}").is_ok());
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("[1]"), "[1]");
    }
}
