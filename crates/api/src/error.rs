//! # API 统一错误处理
//!
//! 把代理网关与设置存储的错误映射为 HTTP 状态码和 `{success: false, error}` 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tradesheet_core::store::error::StoreError;
use tradesheet_gateway::proxy::ProxyError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求参数错误或后端未配置 (400)
    #[error("{0}")]
    BadRequest(String),

    /// 远程脚本调用失败，消息透传给调用方 (500)
    #[error("{0}")]
    Upstream(String),

    /// 本地故障，细节只记录日志 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => {
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse::from_msg(message))).into_response()
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::NotConfigured | ProxyError::MissingUrl => {
                ApiError::BadRequest(err.to_string())
            }
            ProxyError::Upstream(msg) => ApiError::Upstream(msg),
            // 中继路径上把存储错误信息带给调用方
            ProxyError::Store(_) => {
                tracing::error!("中继读取设置失败: {}", err);
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_relay_store_failure_keeps_message() {
        let err = ApiError::from(ProxyError::Store(StoreError::Database(
            "database is locked".into(),
        )));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Settings store error: Database error: database is locked");
    }

    #[tokio::test]
    async fn test_settings_route_store_failure_stays_generic() {
        let err = ApiError::from(StoreError::Database("database is locked".into()));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unconfigured_is_bad_request() {
        let (status, body) = body_of(ApiError::from(ProxyError::NotConfigured)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Google Script URL not configured. Please check settings."
        );
    }
}
