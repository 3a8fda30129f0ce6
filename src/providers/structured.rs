use super::{get_http_client, prompt, read_error_body, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::GatewayError;
use crate::schema::{result_schema, to_response_schema};
use crate::types::BirthInput;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Gemini 原生 generateContent + responseSchema 适配器
#[derive(Debug, Clone)]
pub struct StructuredOutputAdapter {
    pub model: String,
    pub temperature: f32,
}

/// Gemini API 请求格式
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: Value,
}

/// Gemini API 响应格式，字段缺失时报 SchemaError
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl StructuredOutputAdapter {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }

    pub fn build_request(&self, input: &BirthInput) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: prompt::structured_system_instruction(input),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt::USER_TURN.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: to_response_schema(result_schema()),
            },
        }
    }
}

/// 拼接 candidates[0] 的全部文本片段
fn candidate_text(resp: GeminiResponse) -> Result<String> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GatewayError::schema(format!("请求被上游拦截: {}", reason)));
    }

    let parts = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| GatewayError::schema("缺少 candidates[0].content"))?;

    let texts: Vec<String> = parts.into_iter().filter_map(|part| part.text).collect();
    if texts.is_empty() {
        return Err(GatewayError::schema("candidates[0] 中没有文本"));
    }

    Ok(texts.join(""))
}

impl ProviderAdapter for StructuredOutputAdapter {
    async fn generate(&self, config: &ProviderConfig, input: &BirthInput) -> Result<String> {
        let client = get_http_client();

        // 不在 URL 中暴露 API 密钥
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url, self.model
        );
        let req = self.build_request(input);

        info!("发送请求到上游: {}", url);

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &config.api_key)
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = read_error_body(response, &config.api_key).await;
            return Err(GatewayError::from_upstream_status(status.as_u16(), &error_body));
        }

        let body = response.text().await?;
        let resp: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::schema(format!("响应外壳无法解析: {}", e)))?;

        candidate_text(resp)
    }
}
