use super::response::{self, BoxBody, BoxError};
use crate::gateway::Gateway;
use crate::metrics;
use http_body_util::BodyExt;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tracing::{info_span, Instrument};

pub const GENERATE_PATH: &str = "/api/generate";

/// 处理 HTTP 请求的主路由
pub async fn handle_request<B>(
    req: Request<B>,
    gateway: Arc<Gateway>,
) -> Result<Response<BoxBody>, BoxError>
where
    B: hyper::body::Body,
    B::Error: Into<BoxError>,
{
    match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, GENERATE_PATH) => Ok(response::preflight()),
        (&Method::POST, GENERATE_PATH) => {
            let request_id = uuid::Uuid::new_v4();
            generate(req, gateway)
                .instrument(info_span!("generate", %request_id))
                .await
        }
        (_, GENERATE_PATH) => Ok(response::method_not_allowed()),
        (&Method::GET, "/health") => Ok(health_check(&gateway)),
        (&Method::GET, "/metrics") => Ok(metrics_endpoint()),
        _ => Ok(response::not_found()),
    }
}

/// 健康检查端点
fn health_check(gateway: &Gateway) -> Response<BoxBody> {
    response::json(
        StatusCode::OK,
        &json!({
            "status": "ok",
            "service": "bazigate",
            "provider": gateway.provider_kind().as_str()
        }),
    )
}

/// 指标端点
fn metrics_endpoint() -> Response<BoxBody> {
    response::text(metrics::global_metrics().export_prometheus())
}

/// 生成端点
async fn generate<B>(req: Request<B>, gateway: Arc<Gateway>) -> Result<Response<BoxBody>, BoxError>
where
    B: hyper::body::Body,
    B::Error: Into<BoxError>,
{
    let metrics = metrics::global_metrics();

    // 读取请求体；读取失败按空请求体处理，由校验步骤报 400
    let whole_body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let e: BoxError = e.into();
            tracing::warn!("读取请求体失败: {}", e);
            Default::default()
        }
    };

    let outcome = gateway.generate(&whole_body).await;
    match &outcome.result {
        Ok(result) => {
            metrics.record_success();
            Ok(response::json(StatusCode::OK, result))
        }
        Err(e) => {
            metrics.record_failure(e.kind());
            let message = outcome.error_message().unwrap_or_default();
            Ok(response::gateway_error(e, &message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigProvider, MapEnv};
    use http_body_util::Full;
    use hyper::body::Bytes;

    fn create_test_gateway() -> Arc<Gateway> {
        let config = Config::default();
        let provider = ConfigProvider::new(Arc::new(MapEnv::new()), &config);
        Arc::new(Gateway::new(&config, provider))
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn body_json(response: Response<BoxBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = handle_request(request(Method::GET, "/health", ""), create_test_gateway())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "rest_chat");
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let response = handle_request(
            request(Method::OPTIONS, GENERATE_PATH, ""),
            create_test_gateway(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response =
                handle_request(request(method, GENERATE_PATH, ""), create_test_gateway())
                    .await
                    .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body_json(response).await["error"], "Method Not Allowed");
        }
    }

    #[tokio::test]
    async fn test_missing_birth_place() {
        let response = handle_request(
            request(Method::POST, GENERATE_PATH, r#"{"birthDate":"1998-08-15"}"#),
            create_test_gateway(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let response = handle_request(
            request(Method::POST, GENERATE_PATH, r#"{"birthPlace":"北京"}"#),
            create_test_gateway(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("API_KEY"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = handle_request(request(Method::GET, "/v1/models", ""), create_test_gateway())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
