//! # DTO (Data Transfer Object) 层
//!
//! HTTP 边界上的请求与响应结构体。字段名沿用前端约定的 camelCase，
//! 并派生 `utoipa::ToSchema` 进入 Swagger 文档。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tradesheet_gateway::proxy::{ConnectionProbe, ConnectionReport};
use utoipa::ToSchema;

// ============================================================
//  中继相关 DTO
// ============================================================

/// 中继请求体，与跨域通道使用相同的 `{action, data, sheetId}` 形状
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// 远程动作名
    #[schema(example = "getTrades")]
    pub action: String,
    /// 动作载荷，可缺省
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    /// 目标表格，为空时使用已保存的设置
    #[serde(default)]
    #[schema(example = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")]
    pub sheet_id: Option<String>,
}

/// 连接测试请求体，携带尚未保存的候选配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    /// 候选 Apps Script 地址
    #[serde(default)]
    #[schema(example = "https://script.google.com/macros/s/AKfycb/exec")]
    pub google_script_url: Option<String>,
    /// 候选表格标识
    #[serde(default)]
    pub google_sheet_id: Option<String>,
}

impl From<TestConnectionRequest> for ConnectionProbe {
    fn from(req: TestConnectionRequest) -> Self {
        Self {
            google_script_url: req.google_script_url,
            google_sheet_id: req.google_sheet_id,
        }
    }
}

/// 连接测试结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestConnectionResponse {
    /// 远程往返是否成功
    pub success: bool,
    /// 失败原因
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ConnectionReport> for TestConnectionResponse {
    fn from(report: ConnectionReport) -> Self {
        Self {
            success: report.success,
            error: report.error,
        }
    }
}

// ============================================================
//  健康检查 DTO
// ============================================================

/// 存活探针响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// 当前时间 (ISO 8601)
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub timestamp: String,
    /// 进程已运行秒数
    #[schema(example = 3600)]
    pub uptime_secs: u64,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 失败响应 `{success: false, error}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}
