//! # Google Sheets 中继路由
//!
//! 浏览器无法安全持有脚本地址时，由这里代为外呼 Apps Script。

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;
use tradesheet_core::gateway::envelope::{ActionEnvelope, ActionName};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, RelayRequest, TestConnectionRequest, TestConnectionResponse};

/// 中继一个表格动作
///
/// 使用已保存的设置调用远程脚本，并原样返回其响应体。
#[utoipa::path(
    post,
    path = "/api/google-sheets",
    tag = "中继 (Relay)",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "远程脚本的原始响应 (Result Envelope)"),
        (status = 400, description = "未配置脚本地址或请求无效", body = ApiErrorResponse),
        (status = 500, description = "远程调用失败", body = ApiErrorResponse)
    )
)]
pub async fn relay(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let action = req
        .action
        .parse::<ActionName>()
        .map_err(ApiError::BadRequest)?;

    let envelope = ActionEnvelope::new(action, req.data, req.sheet_id.unwrap_or_default());
    let body = state.proxy.forward(envelope).await?;
    Ok(Json(body))
}

/// 测试候选配置的连通性
///
/// 只做一次只读往返，不会保存任何设置。
#[utoipa::path(
    post,
    path = "/api/test-google-connection",
    tag = "中继 (Relay)",
    request_body = TestConnectionRequest,
    responses(
        (status = 200, description = "测试结果", body = TestConnectionResponse),
        (status = 400, description = "缺少脚本地址", body = ApiErrorResponse)
    )
)]
pub async fn test_connection(
    State(state): State<AppState>,
    payload: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> Result<Json<TestConnectionResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let report = state.proxy.test_connection(req.into()).await?;
    Ok(Json(report.into()))
}
