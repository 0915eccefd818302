use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 默认数据目录，与 `DatabaseConfig::default()` 保持一致
const DEFAULT_DATA_DIR: &str = "data";

/// 设置存储层使用的数据目录。
///
/// 只在进程内第一次调用时生效，之后的调用被忽略。
///
/// # Returns
/// * `true` - 本次设置生效。
/// * `false` - 数据目录此前已经设置过。
pub fn set_root_dir(path: PathBuf) -> bool {
    DATA_DIR.set(path).is_ok()
}

/// 当前数据目录，未设置时为 `data`。
pub fn get_root_dir() -> PathBuf {
    DATA_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
