use crate::error::GatewayError;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::error;

// 统一的 Body 类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
pub const ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

/// 所有响应都带的 CORS 头
fn with_cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Credentials", "true")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .header("Access-Control-Allow-Methods", ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
}

fn full(body: impl Into<Bytes>) -> BoxBody {
    Full::new(body.into())
        .map_err(|e| Box::new(e) as BoxError)
        .boxed()
}

/// 构建响应；header 都是常量，构建失败时退回裸 500
fn finish(builder: Builder, body: BoxBody) -> Response<BoxBody> {
    builder.body(body).unwrap_or_else(|e| {
        error!("构建响应失败: {}", e);
        let mut response = Response::new(full("Internal Server Error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// JSON 响应
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<BoxBody> {
    match serde_json::to_vec(value) {
        Ok(body) => finish(
            with_cors(Response::builder().status(status))
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8")),
            full(body),
        ),
        Err(e) => {
            error!("序列化响应失败: {}", e);
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "服务器内部未知错误")
        }
    }
}

/// `{"error": message}` 形式的错误响应
pub fn error_message(status: StatusCode, message: &str) -> Response<BoxBody> {
    let body = json!({ "error": message }).to_string();
    finish(
        with_cors(Response::builder().status(status))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8")),
        full(body),
    )
}

/// 网关错误响应，message 由调用方做过密钥遮盖
pub fn gateway_error(err: &GatewayError, message: &str) -> Response<BoxBody> {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_message(status, message)
}

/// 预检请求：200，空 body，只有 CORS 头
pub fn preflight() -> Response<BoxBody> {
    finish(
        with_cors(Response::builder().status(StatusCode::OK)),
        Empty::<Bytes>::new()
            .map_err(|e| Box::new(e) as BoxError)
            .boxed(),
    )
}

pub fn method_not_allowed() -> Response<BoxBody> {
    error_message(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

pub fn not_found() -> Response<BoxBody> {
    error_message(StatusCode::NOT_FOUND, "Not Found")
}

/// 纯文本响应（/metrics）
pub fn text(body: String) -> Response<BoxBody> {
    finish(
        with_cors(Response::builder().status(StatusCode::OK))
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4")),
        full(body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response<BoxBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_cors(response: &Response<BoxBody>) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], ALLOW_METHODS);
        assert_eq!(headers["access-control-allow-headers"], ALLOW_HEADERS);
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = preflight();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = method_not_allowed();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"error": "Method Not Allowed"}));
    }

    #[tokio::test]
    async fn test_gateway_error_status() {
        let err = GatewayError::from_upstream_status(429, "slow down");
        let response = gateway_error(&err, &err.to_string());
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_cors(&response);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("slow down"));
    }

    #[test]
    fn test_not_found() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_cors(&response);
    }
}
