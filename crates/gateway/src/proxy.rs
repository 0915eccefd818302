use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use tradesheet_core::common::is_blank;
use tradesheet_core::gateway::envelope::{ActionEnvelope, ActionName, ResultEnvelope};
use tradesheet_core::store::error::StoreError;
use tradesheet_core::store::port::SettingsStore;

use crate::remote::ScriptClient;

/// # Summary
/// 代理网关错误枚举。
///
/// # Invariants
/// - 所有变体都能转换为 `{success: false, error}` 信封，不会以未处理异常的形式逃逸。
#[derive(Error, Debug)]
pub enum ProxyError {
    /// 设置中没有脚本地址，未发起外呼
    #[error("Google Script URL not configured. Please check settings.")]
    NotConfigured,

    /// 连接测试请求缺少脚本地址
    #[error("Google Script URL is required for testing.")]
    MissingUrl,

    /// 外呼失败 (网络、状态码或响应格式)
    #[error("{0}")]
    Upstream(String),

    /// 读取设置失败
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

/// Candidate configuration submitted by a settings page before saving.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProbe {
    #[serde(default)]
    pub google_script_url: Option<String>,
    #[serde(default)]
    pub google_sheet_id: Option<String>,
}

/// Result of a connection test, serialized as `{success, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionReport {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

/// # Summary
/// 代理网关：持有远程端点配置的信任边界，把中继请求转换为对远程脚本的外呼。
///
/// # Invariants
/// - 每次调用都重新读取设置，配置变更无需重启即可生效。
/// - 远程返回的信封原样透传。
pub struct ProxyGateway {
    settings: Arc<dyn SettingsStore>,
    script: ScriptClient,
}

impl ProxyGateway {
    pub fn new(settings: Arc<dyn SettingsStore>, script: ScriptClient) -> Self {
        Self { settings, script }
    }

    /// # Summary
    /// 转发一个中继请求。
    ///
    /// # Logic
    /// 1. 读取当前设置；未配置脚本地址时直接返回 `NotConfigured`。
    /// 2. 请求中的 `sheetId` 为空时回退到设置中的 `googleSheetId`。
    /// 3. 以与跨域通道相同的信封形状外呼远程脚本。
    /// 4. 外呼异常统一转换为 `Upstream`。
    ///
    /// # Arguments
    /// * `envelope` - 客户端发来的 `{action, data, sheetId}`。
    ///
    /// # Returns
    /// * 远程脚本的原始响应体。
    pub async fn forward(&self, envelope: ActionEnvelope) -> Result<Value, ProxyError> {
        let settings = self.settings.get_settings().await?;
        let Some(script_url) = settings.script_url() else {
            warn!(action = %envelope.action, "relay request rejected: script URL not configured");
            return Err(ProxyError::NotConfigured);
        };

        let sheet_id = if envelope.sheet_id.trim().is_empty() {
            settings.google_sheet_id.clone().unwrap_or_default()
        } else {
            envelope.sheet_id
        };
        let outbound = ActionEnvelope {
            sheet_id,
            ..envelope
        };

        self.script.call(script_url, &outbound).await.map_err(|e| {
            error!(action = %outbound.action, error = %e, "Error in /api/google-sheets");
            ProxyError::Upstream(e.to_string())
        })
    }

    /// # Summary
    /// 用候选配置做一次轻量往返，验证可连通性。
    ///
    /// # Logic
    /// 1. 候选地址为空时返回 `MissingUrl`。
    /// 2. 发送只读的 `getStrategies` 请求。
    /// 3. 远程报告错误或外呼失败都记为 `success: false`。
    ///
    /// 不读也不写设置存储。
    pub async fn test_connection(&self, probe: ConnectionProbe) -> Result<ConnectionReport, ProxyError> {
        if is_blank(probe.google_script_url.as_deref()) {
            return Err(ProxyError::MissingUrl);
        }
        let script_url = probe.google_script_url.unwrap_or_default();
        let envelope = ActionEnvelope::new(
            ActionName::GetStrategies,
            None,
            probe.google_sheet_id.unwrap_or_default(),
        );

        let outcome = self
            .script
            .call(script_url.trim(), &envelope)
            .await
            .and_then(ResultEnvelope::into_result);

        Ok(match outcome {
            Ok(_) => {
                info!(script_url = %script_url.trim(), "connection test succeeded");
                ConnectionReport::ok()
            }
            Err(e) => {
                warn!(script_url = %script_url.trim(), error = %e, "connection test failed");
                ConnectionReport::failed(e.to_string())
            }
        })
    }
}
