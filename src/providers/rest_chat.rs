use super::{get_http_client, prompt, read_error_body, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::{excerpt, redact, GatewayError};
use crate::types::{BirthInput, ChatEnvelope, ChatRequest, Message, ResponseFormat};
use crate::Result;
use tracing::{debug, info};

/// OpenAI 兼容的 /chat/completions 适配器
#[derive(Debug, Clone)]
pub struct RestChatAdapter {
    pub model: String,
    pub temperature: f32,
}

impl RestChatAdapter {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }

    pub fn build_request(&self, input: &BirthInput) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(prompt::rest_chat_system_prompt(input)),
                Message::user(prompt::USER_TURN),
            ],
            response_format: ResponseFormat::json_object(),
            temperature: self.temperature,
        }
    }
}

impl ProviderAdapter for RestChatAdapter {
    async fn generate(&self, config: &ProviderConfig, input: &BirthInput) -> Result<String> {
        let client = get_http_client();
        let url = format!("{}/chat/completions", config.base_url);
        let req = self.build_request(input);

        info!("发送请求到上游: {}", url);

        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = read_error_body(response, &config.api_key).await;
            return Err(GatewayError::from_upstream_status(status.as_u16(), &error_body));
        }

        let body = response.text().await?;
        let envelope: ChatEnvelope = serde_json::from_str(&body).map_err(|e| {
            debug!(
                "上游响应不是合法的聊天外壳: {}",
                excerpt(&redact(&body, &config.api_key))
            );
            GatewayError::schema(format!("响应外壳无法解析: {}", e))
        })?;

        envelope.into_content()
    }
}
