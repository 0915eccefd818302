use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::fs;
use std::path::Path;
use tracing::info;
use tradesheet_core::store::error::StoreError;
use tradesheet_core::store::port::{Settings, SettingsPatch, SettingsStore};

/// 设置数据库文件名
const SETTINGS_DB: &str = "settings.db";

const SELECT_SETTINGS: &str =
    "SELECT id, google_script_url, google_sheet_id, updated_at FROM settings WHERE id = ?";

type SettingsRow = (i64, Option<String>, Option<String>, DateTime<Utc>);

/// `SettingsStore` 的 SQLite 实现。
///
/// # Summary
/// 在 `settings.db` 的 `settings` 表中保存单例设置行 (`id = 1`)。
///
/// # Invariants
/// * 表结构在实例创建时初始化。
/// * 行不存在时读取返回空设置，而不是错误。
/// * 写入在事务中完成读取-合并-写回，并发写入不会丢失字段。
/// * 连接池只有一个连接。
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// 在配置的数据目录下打开 (或创建) 设置数据库。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn new() -> Result<Self, StoreError> {
        let path = crate::config::get_root_dir().join(SETTINGS_DB);
        Self::open(&path).await
    }

    /// 打开指定路径的设置数据库。
    ///
    /// # Logic
    /// 1. 确保父目录存在。
    /// 2. 以 `create_if_missing` 连接。
    /// 3. 执行 DDL 初始化 `settings` 表。
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // 单连接：写事务串行化，避免 SQLITE_BUSY
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY,
                google_script_url TEXT,
                google_sheet_id TEXT,
                updated_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!(path = %path.display(), "settings store ready");
        Ok(Self { pool })
    }

    async fn load(tx: &mut Transaction<'_, Sqlite>) -> Result<Option<Settings>, StoreError> {
        let row = sqlx::query_as::<_, SettingsRow>(SELECT_SETTINGS)
            .bind(Settings::SINGLETON_ID)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(row.map(into_settings))
    }
}

fn into_settings(row: SettingsRow) -> Settings {
    Settings {
        id: row.0,
        google_script_url: row.1,
        google_sheet_id: row.2,
        updated_at: row.3,
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get_settings(&self) -> Result<Settings, StoreError> {
        let row = sqlx::query_as::<_, SettingsRow>(SELECT_SETTINGS)
            .bind(Settings::SINGLETON_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(row.map(into_settings).unwrap_or_else(Settings::empty))
    }

    /// # Summary
    /// 合并部分更新并写回单例行。
    ///
    /// # Logic
    /// 1. 开启事务并读取当前行 (不存在时使用空设置)。
    /// 2. 应用 `patch`。
    /// 3. `INSERT OR REPLACE` 写回并提交。
    ///
    /// # Returns
    /// * 合并后的设置。
    async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut settings = Self::load(&mut tx).await?.unwrap_or_else(Settings::empty);
        settings.apply(patch);

        sqlx::query(
            "INSERT OR REPLACE INTO settings (id, google_script_url, google_sheet_id, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(settings.id)
        .bind(&settings.google_script_url)
        .bind(&settings.google_sheet_id)
        .bind(settings.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(
            configured = settings.script_url().is_some(),
            sheet_id = settings.google_sheet_id.as_deref().unwrap_or_default(),
            "settings saved"
        );
        Ok(settings)
    }
}
