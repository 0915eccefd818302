use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tradesheet_core::store::port::{Settings, SettingsPatch};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ApiResponse};

/// 读取当前设置
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "设置 (Settings)",
    responses(
        (status = 200, description = "当前设置", body = ApiResponse<Settings>),
        (status = 500, description = "服务器内部错误", body = ApiErrorResponse)
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let settings = state.settings_store.get_settings().await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// 保存设置
///
/// 只替换请求中给出的字段；下一次中继调用立即使用新值。
#[utoipa::path(
    post,
    path = "/api/settings",
    tag = "设置 (Settings)",
    request_body = SettingsPatch,
    responses(
        (status = 200, description = "合并后的设置", body = ApiResponse<Settings>),
        (status = 400, description = "请求体无效", body = ApiErrorResponse),
        (status = 500, description = "服务器内部错误", body = ApiErrorResponse)
    )
)]
pub async fn save_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let Json(patch) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let settings = state.settings_store.save_settings(patch).await?;
    tracing::info!(
        configured = settings.script_url().is_some(),
        "settings updated through API"
    );
    Ok(Json(ApiResponse::ok(settings)))
}
