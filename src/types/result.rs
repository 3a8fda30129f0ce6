use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 网关对外输出的统一结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub bazi: Bazi,
    pub profile: Profile,
    pub recommendations: Vec<Recommendation>,
}

/// 四柱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bazi {
    #[serde(deserialize_with = "text")]
    pub year: String,
    #[serde(deserialize_with = "text")]
    pub month: String,
    #[serde(deserialize_with = "text")]
    pub day: String,
    #[serde(deserialize_with = "text")]
    pub hour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "text")]
    pub wuxing: String,
    #[serde(deserialize_with = "text")]
    pub archetype: String,
    #[serde(deserialize_with = "keywords")]
    pub keywords: String,
    #[serde(deserialize_with = "text")]
    pub lucky_color: String,
    #[serde(deserialize_with = "text")]
    pub lucky_number: String,
    #[serde(deserialize_with = "text")]
    pub lucky_direction: String,
    #[serde(deserialize_with = "text")]
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(deserialize_with = "text")]
    pub city: String,
    #[serde(deserialize_with = "text")]
    pub province: String,
    pub tags: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub reason: String,
    pub score: f64,
    pub distance: f64,
    pub dimensions: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub career: f64,
    pub wealth: f64,
    pub relationship: f64,
    pub health: f64,
    pub environment: f64,
}

impl Dimensions {
    pub fn values(&self) -> [(&'static str, f64); 5] {
        [
            ("career", self.career),
            ("wealth", self.wealth),
            ("relationship", self.relationship),
            ("health", self.health),
            ("environment", self.environment),
        ]
    }
}

/// 文本字段宽松解析：模型偶尔把 luckyNumber 这类字段写成数字
fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(unexpected(&other)),
    }
}

/// keywords 额外允许字符串数组，按 " / " 拼接
fn keywords<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(unexpected(&other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(" / ")),
        other => Err(unexpected(&other)),
    }
}

// 只报告类型，不回显上游内容
fn unexpected<E: de::Error>(value: &Value) -> E {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    };
    de::Error::custom(format!("期望字符串，得到{}", kind))
}
