use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use tradesheet_core::store::error::StoreError;
use tradesheet_core::store::port::{Settings, SettingsPatch, SettingsStore};

/// # Summary
/// 基于内存的设置存储，进程退出即丢失。
///
/// 用于测试以及不需要持久化的部署。
pub struct MemorySettingsStore {
    settings: RwLock<Settings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::with_settings(Settings::empty())
    }

    /// 以给定的初始设置创建存储
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_settings(&self) -> Result<Settings, StoreError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let mut guard = self.settings.write().await;
        guard.apply(patch);
        debug!(configured = guard.script_url().is_some(), "in-memory settings updated");
        Ok(guard.clone())
    }
}
