use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode as AxumStatus;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tradesheet_api::server::{AppState, build_router};
use tradesheet_api::types::{ApiResponse, HealthResponse, TestConnectionResponse};
use tradesheet_core::common::ensure_crypto_provider;
use tradesheet_core::config::{DeploymentMode, GatewayConfig};
use tradesheet_core::store::port::{Settings, SettingsStore};
use tradesheet_gateway::client::SheetsClient;
use tradesheet_gateway::proxy::ProxyGateway;
use tradesheet_gateway::remote::ScriptClient;
use tradesheet_store::settings::SqliteSettingsStore;

// ============================================================
//  测试替身：远程 Apps Script
// ============================================================

#[derive(Default)]
struct ScriptStub {
    hits: AtomicUsize,
    last_sheet_id: std::sync::Mutex<Option<String>>,
}

async fn script_exec(
    State(stub): State<Arc<ScriptStub>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let sheet_id = params.get("sheetId").cloned().unwrap_or_default();
    *stub.last_sheet_id.lock().unwrap() = Some(sheet_id.clone());

    if sheet_id == "broken" {
        return (AxumStatus::INTERNAL_SERVER_ERROR, "Script function not found").into_response();
    }
    let body = match params.get("action").map(String::as_str) {
        Some("getTrades") => json!({
            "success": true,
            "data": [{
                "id": "12",
                "date": "2024-06-03",
                "stockName": "HDFCBANK",
                "tradeType": "Sell",
                "quantity": "40",
                "entryPrice": "1522.4",
                "isTradeTaken": "yes",
                "setupFollowed": "no"
            }]
        }),
        Some("getStrategies") => json!({ "success": true, "data": [] }),
        _ => json!({ "success": true }),
    };
    axum::Json(body).into_response()
}

async fn spawn_script_stub() -> (String, Arc<ScriptStub>) {
    let stub = Arc::new(ScriptStub::default());
    let router = Router::new()
        .route("/exec", get(script_exec))
        .with_state(stub.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}/exec", addr), stub)
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server() -> (String, Arc<dyn SettingsStore>, tempfile::TempDir) {
    ensure_crypto_provider();
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: Arc<dyn SettingsStore> = Arc::new(
        SqliteSettingsStore::open(&tmp_dir.path().join("settings.db"))
            .await
            .unwrap(),
    );

    let script = ScriptClient::new(Duration::from_secs(5)).unwrap();
    let proxy = Arc::new(ProxyGateway::new(store.clone(), script));
    let app = build_router(AppState::new(proxy, store.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, store, tmp_dir)
}

#[tokio::test]
async fn test_full_relay_workflow() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let (script_url, stub) = spawn_script_stub().await;
    let (base_url, store, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();

    // ============================================
    // Case 1: 未配置脚本地址时拒绝中继，且不外呼
    // ============================================
    let res = client
        .post(format!("{}/api/google-sheets", base_url))
        .json(&json!({ "action": "getTrades", "sheetId": "S1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Google Script URL not configured. Please check settings."
    );
    assert_eq!(stub.hits.load(Ordering::SeqCst), 0);

    // ============================================
    // Case 2: 保存设置
    // ============================================
    let res = client
        .post(format!("{}/api/settings", base_url))
        .json(&json!({ "googleScriptUrl": script_url, "googleSheetId": "stored-sheet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let saved: ApiResponse<Settings> = res.json().await.unwrap();
    assert!(saved.success);
    assert_eq!(saved.data.unwrap().google_sheet_id.as_deref(), Some("stored-sheet"));

    let res = client
        .get(format!("{}/api/settings", base_url))
        .send()
        .await
        .unwrap();
    let current: ApiResponse<Settings> = res.json().await.unwrap();
    assert_eq!(current.data.unwrap().script_url(), Some(script_url.as_str()));

    // ============================================
    // Case 3: 中继透传，空 sheetId 回退到设置值
    // ============================================
    let res = client
        .post(format!("{}/api/google-sheets", base_url))
        .json(&json!({ "action": "getTrades", "data": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["quantity"], "40");
    assert_eq!(
        stub.last_sheet_id.lock().unwrap().as_deref(),
        Some("stored-sheet")
    );

    // ============================================
    // Case 4: 未知动作
    // ============================================
    let res = client
        .post(format!("{}/api/google-sheets", base_url))
        .json(&json!({ "action": "dropTables", "sheetId": "S1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unknown action: dropTables");

    // ============================================
    // Case 5: 远程失败 → 500 且错误信息透传
    // ============================================
    let res = client
        .post(format!("{}/api/google-sheets", base_url))
        .json(&json!({ "action": "getTrades", "sheetId": "broken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Script function not found")
    );

    // ============================================
    // Case 6: 通过 relay 模式的客户端端到端读取
    // ============================================
    let gateway_config = GatewayConfig {
        mode: DeploymentMode::Relay,
        relay_base_url: base_url.clone(),
        timeout_secs: 5,
    };
    let sheets = SheetsClient::new("", "", &gateway_config).unwrap();
    let trades = sheets.get_trades().await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].id, 12);
    assert_eq!(trades[0].quantity, 40);
    assert!(trades[0].is_trade_taken);
    assert!(!trades[0].setup_followed);
    assert!(sheets.get_strategies().await.unwrap().is_empty());

    // 设置未被中继调用修改
    let settings = store.get_settings().await.unwrap();
    assert_eq!(settings.google_sheet_id.as_deref(), Some("stored-sheet"));
}

#[tokio::test]
async fn test_connection_endpoint() {
    let (script_url, stub) = spawn_script_stub().await;
    let (base_url, store, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();
    let before = store.get_settings().await.unwrap();

    // 缺少地址
    let res = client
        .post(format!("{}/api/test-google-connection", base_url))
        .json(&json!({ "googleSheetId": "candidate" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Google Script URL is required for testing.");

    // 可达的候选地址
    let res = client
        .post(format!("{}/api/test-google-connection", base_url))
        .json(&json!({ "googleScriptUrl": script_url, "googleSheetId": "candidate" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: TestConnectionResponse = res.json().await.unwrap();
    assert!(report.success);
    assert_eq!(report.error, None);
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);

    // 失败的候选地址仍以 200 报告
    let res = client
        .post(format!("{}/api/test-google-connection", base_url))
        .json(&json!({ "googleScriptUrl": script_url, "googleSheetId": "broken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: TestConnectionResponse = res.json().await.unwrap();
    assert!(!report.success);
    assert!(report.error.unwrap().contains("500"));

    // 连接测试从不写入设置
    let after = store.get_settings().await.unwrap();
    assert_eq!(after.google_script_url, before.google_script_url);
    assert_eq!(after.google_sheet_id, before.google_sheet_id);
}

#[tokio::test]
async fn test_health_and_docs() {
    let (base_url, _store, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: HealthResponse = res.json().await.unwrap();
    assert_eq!(health.status, "ok");

    let res = client
        .get(format!("{}/api-docs/openapi.json", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await.unwrap();
    assert!(doc["paths"]["/api/google-sheets"]["post"].is_object());
    assert!(doc["paths"]["/api/settings"]["get"].is_object());
    assert!(doc["paths"]["/api/settings"]["post"].is_object());
}

#[tokio::test]
async fn test_malformed_body_is_rejected_as_envelope() {
    let (base_url, _store, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/google-sheets", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}
