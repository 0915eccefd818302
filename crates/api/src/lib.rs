//! # `tradesheet-api` - HTTP 中继层
//!
//! 交易日志后端的 HTTP 服务入口。使用 `axum` 构建路由，通过 `utoipa`
//! 生成 OpenAPI 文档。
//!
//! ## 架构职责
//! - 接收浏览器端的中继请求，交给 `ProxyGateway` 外呼 Apps Script
//! - 读写脚本地址与表格设置
//! - 把网关与存储错误转换为 `{success: false, error}` 响应

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
