mod logging;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tradesheet_api::server::{AppState, start_server};
use tradesheet_core::common::ensure_crypto_provider;
use tradesheet_core::store::port::SettingsStore;
use tradesheet_gateway::proxy::ProxyGateway;
use tradesheet_gateway::remote::ScriptClient;
use tradesheet_store::settings::SqliteSettingsStore;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化设置存储与代理网关，并把它们注入 HTTP 层。
///
/// # Logic
/// 1. 加载配置并初始化全局日志。
/// 2. 安装 TLS 加密后端。
/// 3. 实例化基础设施层 (SettingsStore、ScriptClient)。
/// 4. 构造代理网关并启动 HTTP 服务。
/// 5. 收到退出信号后优雅停机。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = settings::load(settings::DEFAULT_CONFIG_FILE)?;
    let _log_guard = logging::init(&config.logging);
    info!("Tradesheet backend starting...");

    // 2. TLS
    ensure_crypto_provider();

    // 3. 基础设施层
    if !tradesheet_store::config::set_root_dir(PathBuf::from(&config.database.data_dir)) {
        warn!("data directory was already set, ignoring configured value");
    }
    let store: Arc<dyn SettingsStore> = Arc::new(SqliteSettingsStore::new().await?);
    match store.get_settings().await?.script_url() {
        Some(url) => info!(script_url = %url, "Google Apps Script endpoint configured"),
        None => warn!("Google Script URL not configured; relay calls will be rejected until settings are saved"),
    }
    let script = ScriptClient::new(config.gateway.timeout())?;

    // 4. 代理网关与 HTTP 服务
    let proxy = Arc::new(ProxyGateway::new(store.clone(), script));
    let state = AppState::new(proxy, store);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    start_server(state, &bind_addr, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// 等待 Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received. Exiting...");
}
