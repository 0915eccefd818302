use config::{Config, ConfigError, Environment, File};
use tradesheet_core::config::AppConfig;

/// 默认配置文件路径 (不含扩展名，由 `config` 按格式探测)
pub const DEFAULT_CONFIG_FILE: &str = "config/tradesheet";

/// 环境变量前缀，例如 `TRADESHEET__SERVER__PORT=8080`
const ENV_PREFIX: &str = "TRADESHEET";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 读取可选的配置文件 (文件不存在时跳过)。
/// 2. 叠加 `TRADESHEET__*` 环境变量。
/// 3. 未出现的键取 `AppConfig` 的默认值。
///
/// # Arguments
/// * `file` - 配置文件路径，不含扩展名。
pub fn load(file: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tradesheet_core::config::DeploymentMode;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent").to_string_lossy()).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.data_dir, "data");
        assert_eq!(config.gateway.mode, DeploymentMode::Relay);
        assert_eq!(config.gateway.timeout_secs, 30);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_file_overrides_selected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tradesheet.toml");
        fs::write(
            &path,
            r#"
[server]
port = 8088

[gateway]
mode = "cross-origin"
timeout_secs = 10

[logging]
level = "debug"
dir = "logs"
"#,
        )
        .unwrap();

        let config = load(&dir.path().join("tradesheet").to_string_lossy()).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.gateway.mode, DeploymentMode::CrossOrigin);
        assert_eq!(config.gateway.timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.dir.as_deref(), Some("logs"));
    }
}
