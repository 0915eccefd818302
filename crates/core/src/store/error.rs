use thiserror::Error;

/// # Summary
/// 设置存储错误。
///
/// # Invariants
/// - 底层驱动错误一律转为字符串，不向上暴露 `sqlx` 类型。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 查询或写入失败
    #[error("Database error: {0}")]
    Database(String),
    /// 打开数据库或建表失败
    #[error("Initialization error: {0}")]
    InitError(String),
}
