//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`，而是由 `crates/app` 的 DI 容器持有并调用。

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use tradesheet_core::store::port::SettingsStore;
use tradesheet_gateway::proxy::ProxyGateway;

use crate::routes::{health, settings, sheets};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `proxy` 与 `settings_store` 共享同一个设置存储，设置写入对下一次中继立即可见。
#[derive(Clone)]
pub struct AppState {
    /// 代理网关
    pub proxy: Arc<ProxyGateway>,
    /// 设置存储
    pub settings_store: Arc<dyn SettingsStore>,
    /// 进程启动时刻，用于健康检查
    pub started_at: Instant,
}

impl AppState {
    pub fn new(proxy: Arc<ProxyGateway>, settings_store: Arc<dyn SettingsStore>) -> Self {
        Self {
            proxy,
            settings_store,
            started_at: Instant::now(),
        }
    }
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tradesheet API",
        version = "0.1.0",
        description = "交易日志的后端中继：代为调用 Google Apps Script，并管理脚本地址与表格设置。",
        license(name = "MIT")
    ),
    tags(
        (name = "中继 (Relay)", description = "表格动作中继与连接测试"),
        (name = "设置 (Settings)", description = "脚本地址与表格标识"),
        (name = "系统 (System)", description = "健康检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的路由树 (含 Swagger UI 与 CORS)，不绑定端口。
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(sheets::relay))
        .routes(routes!(sheets::test_connection))
        .routes(routes!(settings::get_settings, settings::save_settings))
        .routes(routes!(health::health))
        .with_state(state)
        .split_for_parts();

    // 浏览器端页面与后端可能不同源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 绑定 `bind_addr` 并开始服务，直到 `shutdown` 完成。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:5000"`
/// * `shutdown` - 完成时触发优雅停机
pub async fn start_server<F>(
    state: AppState,
    bind_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Tradesheet API listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
