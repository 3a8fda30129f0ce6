pub mod result;

pub use result::{Bazi, Dimensions, NormalizedResult, Profile, Recommendation};

use crate::error::GatewayError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 用户提交的出生信息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthInput {
    pub birth_date: String,
    pub birth_time: String,
    pub birth_place: String,
}

impl BirthInput {
    /// 解析并校验请求体，只有 birthPlace 是必填项
    ///
    /// 非 JSON 或非对象的请求体按空对象处理；birthDate / birthTime 不校验格式，原样透传。
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let birth_place = match value.get("birthPlace") {
            Some(Value::String(place)) if !place.trim().is_empty() => place.clone(),
            _ => return Err(GatewayError::validation("birthPlace")),
        };

        Ok(Self {
            birth_date: passthrough(value.get("birthDate")),
            birth_time: passthrough(value.get("birthTime")),
            birth_place,
        })
    }
}

fn passthrough(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// OpenAI 兼容的聊天请求
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub response_format: ResponseFormat,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// 聊天消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// 聊天响应外壳，字段全部可缺省，缺失时由调用方报 SchemaError
#[derive(Debug, Default, Deserialize)]
pub struct ChatEnvelope {
    #[serde(default)]
    pub choices: Vec<EnvelopeChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnvelopeChoice {
    #[serde(default)]
    pub message: Option<EnvelopeMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnvelopeMessage {
    #[serde(default)]
    pub content: Option<Value>,
}

impl ChatEnvelope {
    /// 取出 choices[0].message.content，必须是字符串
    pub fn into_content(self) -> Result<String> {
        let message = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| GatewayError::schema("缺少 choices[0].message"))?;

        match message.content {
            Some(Value::String(content)) => Ok(content),
            _ => Err(GatewayError::schema("choices[0].message.content 不是字符串")),
        }
    }
}
