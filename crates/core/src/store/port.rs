use super::error::StoreError;
use crate::common::is_blank;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 应用设置，保存远程脚本地址与目标表格标识。
///
/// # Invariants
/// - 单例记录，`id` 固定为 1。
/// - 空白的 `google_script_url` 视为未配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: i64,
    /// Apps Script Web App 部署地址
    #[schema(example = "https://script.google.com/macros/s/AKfycb/exec")]
    pub google_script_url: Option<String>,
    /// 目标 Google Sheet 标识
    #[schema(example = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")]
    pub google_sheet_id: Option<String>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    pub const SINGLETON_ID: i64 = 1;

    /// 空设置，尚未配置任何远程端点
    pub fn empty() -> Self {
        Self {
            id: Self::SINGLETON_ID,
            google_script_url: None,
            google_sheet_id: None,
            updated_at: Utc::now(),
        }
    }

    /// 返回去除空白后的脚本地址，未配置时为 `None`
    pub fn script_url(&self) -> Option<&str> {
        if is_blank(self.google_script_url.as_deref()) {
            None
        } else {
            self.google_script_url.as_deref().map(str::trim)
        }
    }

    /// 将部分更新合并到当前设置
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(url) = patch.google_script_url {
            self.google_script_url = Some(url);
        }
        if let Some(sheet) = patch.google_sheet_id {
            self.google_sheet_id = Some(sheet);
        }
        self.updated_at = Utc::now();
    }
}

/// # Summary
/// 设置的部分更新，缺省字段保持原值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_script_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_sheet_id: Option<String>,
}

/// # Summary
/// 设置存储接口，代理网关在每次调用时从这里读取最新配置。
///
/// # Invariants
/// - 读取返回原子快照；写入对后续读取立即可见。
/// - 实现必须是 `Send` 和 `Sync`。
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// # Summary
    /// 读取当前设置。
    ///
    /// # Logic
    /// 1. 读取单例设置记录。
    /// 2. 若尚未保存过，返回 `Settings::empty()`。
    ///
    /// # Returns
    /// * 成功返回当前设置快照，失败返回 `StoreError`。
    async fn get_settings(&self) -> Result<Settings, StoreError>;

    /// # Summary
    /// 合并并保存部分设置。
    ///
    /// # Logic
    /// 1. 读取当前设置。
    /// 2. 合并 `patch` 中出现的字段。
    /// 3. 持久化并返回合并后的结果。
    ///
    /// # Arguments
    /// * `patch` - 需要更新的字段。
    ///
    /// # Returns
    /// * 合并后的设置。
    async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_url_blank_is_unconfigured() {
        let mut settings = Settings::empty();
        assert!(settings.script_url().is_none());

        settings.apply(SettingsPatch {
            google_script_url: Some("  ".into()),
            ..Default::default()
        });
        assert!(settings.script_url().is_none());

        settings.apply(SettingsPatch {
            google_script_url: Some(" https://script.google.com/x/exec ".into()),
            ..Default::default()
        });
        assert_eq!(settings.script_url(), Some("https://script.google.com/x/exec"));
    }

    #[test]
    fn test_apply_keeps_untouched_fields() {
        let mut settings = Settings::empty();
        settings.apply(SettingsPatch {
            google_sheet_id: Some("S1".into()),
            ..Default::default()
        });
        settings.apply(SettingsPatch {
            google_script_url: Some("https://x/exec".into()),
            ..Default::default()
        });
        assert_eq!(settings.google_sheet_id.as_deref(), Some("S1"));
        assert_eq!(settings.google_script_url.as_deref(), Some("https://x/exec"));
    }

    #[test]
    fn test_settings_wire_names() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"googleScriptUrl":"https://x/exec"}"#).unwrap();
        assert_eq!(patch.google_script_url.as_deref(), Some("https://x/exec"));
        assert!(patch.google_sheet_id.is_none());
    }
}
