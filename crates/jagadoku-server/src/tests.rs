//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use jagadoku_core::db::Database;
use jagadoku_core::identity::{GoogleIdentity, StaticIdentity};
use jagadoku_core::models::Profile;
use jagadoku_core::notifications::messages;
use jagadoku_core::sync::{GoogleSheetsClient, MockSheets, TRANSACTIONS_SHEET};
use jagadoku_core::test_utils::MockGoogleServer;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "ya29.valid";

fn profile() -> Profile {
    Profile {
        name: "Budi Santoso".to_string(),
        email: "budi@example.com".to_string(),
        picture: String::new(),
    }
}

fn backends(sheets: &MockSheets, ai: Option<AIClient>) -> Backends {
    Backends {
        ai,
        sheets: Arc::new(sheets.clone()),
        identity: Arc::new(StaticIdentity::new(TOKEN, profile())),
    }
}

fn open_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

fn setup_test_app() -> (Router, MockSheets) {
    let sheets = MockSheets::new();
    let ctx = AppContext::open(Database::in_memory().unwrap()).unwrap();
    let app = create_router(
        ctx,
        backends(&sheets, Some(AIClient::mock())),
        None,
        open_config(),
    );
    (app, sheets)
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn add_tx(app: &Router, amount: Value, kind: &str, category: &str, date: &str) -> Value {
    let (status, json) = send(
        app,
        "POST",
        "/api/transactions",
        Some(json!({
            "amount": amount,
            "type": kind,
            "category": category,
            "description": format!("{} {}", category, date),
            "date": date
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

// ========== Auth ==========

#[tokio::test]
async fn test_api_key_required() {
    let sheets = MockSheets::new();
    let ctx = AppContext::open(Database::in_memory().unwrap()).unwrap();
    let config = ServerConfig {
        require_auth: true,
        api_keys: parse_api_keys("key-one, key-two,,"),
        ..Default::default()
    };
    let app = create_router(ctx, backends(&sheets, None), None, config);

    let (status, json) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Authentication required");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer key-two")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["authMethod"], "api-key");
    assert!(json["user"].is_null());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer key-three")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health needs no credentials
    let (status, json) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["ai"].is_null());
    assert_eq!(json["sheets"], "mock");
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["secret".to_string()];
    assert!(validate_api_key("secret", &keys));
    assert!(!validate_api_key("secret2", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("secret", &[]));
}

#[tokio::test]
async fn test_security_headers() {
    let (app, _) = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

// ========== Transactions & dashboard ==========

#[tokio::test]
async fn test_create_and_list_transactions() {
    let (app, _) = setup_test_app();

    let json = add_tx(&app, json!(5_000_000), "INCOME", "Gaji", "2024-03-01").await;
    assert_eq!(json["created"]["type"], "INCOME");
    add_tx(&app, json!("1.250.000"), "EXPENSE", "Tagihan", "2024-03-02").await;

    let (status, json) = send(&app, "GET", "/api/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    // Newest first
    assert_eq!(json["transactions"][0]["category"], "Tagihan");
    assert_eq!(json["transactions"][0]["amount"], 1_250_000.0);

    let (_, json) = send(&app, "GET", "/api/transactions?date=2024-03-01", None).await;
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_incomplete_transaction_is_noop() {
    let (app, _) = setup_test_app();

    let json = add_tx(&app, json!(""), "EXPENSE", "Makanan", "2024-03-01").await;
    assert!(json["created"].is_null());

    let (status, json) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "amount": 10_000, "type": "EXPENSE", "category": "Makanan", "description": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["created"].is_null());

    let (_, json) = send(&app, "GET", "/api/transactions", None).await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_delete_transaction() {
    let (app, _) = setup_test_app();
    let json = add_tx(&app, json!(75_000), "EXPENSE", "Makanan", "2024-03-01").await;
    let id = json["created"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/transactions/{}", id);
    let (_, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(json["deleted"], true);
    let (status, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], false);
}

#[tokio::test]
async fn test_dashboard() {
    let (app, _) = setup_test_app();
    add_tx(&app, json!(8_000_000), "INCOME", "Gaji", "2024-03-01").await;
    add_tx(&app, json!(1_500_000), "EXPENSE", "Tagihan", "2024-03-02").await;
    add_tx(&app, json!(300_000), "EXPENSE", "Transportasi", "2024-03-02").await;

    let (status, json) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"]["balance"], 6_200_000.0);
    assert_eq!(json["categories"][0]["name"], "Tagihan");
    assert_eq!(json["recent"].as_array().unwrap().len(), 3);

    let (_, json) = send(&app, "GET", "/api/dashboard?date=2024-03-01", None).await;
    assert_eq!(json["summary"]["expenses"], 0.0);
    assert!(json["categories"].as_array().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard?date=03/01/2024")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories() {
    let (app, _) = setup_test_app();
    let (_, json) = send(&app, "GET", "/api/categories", None).await;
    assert_eq!(json["income"][0], "Gaji");
    assert!(json["expense"]
        .as_array()
        .unwrap()
        .contains(&json!("Transportasi")));
}

// ========== Goals ==========

#[tokio::test]
async fn test_goal_lifecycle() {
    let (app, _) = setup_test_app();

    let (_, json) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({ "name": "Laptop", "targetAmount": "10.000.000", "deadline": "2025-06-30" })),
    )
    .await;
    let goal = &json["created"];
    assert_eq!(goal["currentAmount"], 0.0);
    assert_eq!(goal["progressPercent"], 0.0);
    let id = goal["id"].as_str().unwrap().to_string();

    let uri = format!("/api/goals/{}/contribute", id);
    let (_, json) = send(&app, "POST", &uri, Some(json!({ "amount": "2.500.000" }))).await;
    assert_eq!(json["updated"]["currentAmount"], 2_500_000.0);
    assert_eq!(json["updated"]["progressPercent"], 25.0);

    // Withdrawals are negative contributions
    let (_, json) = send(&app, "POST", &uri, Some(json!({ "amount": -500_000 }))).await;
    assert_eq!(json["updated"]["currentAmount"], 2_000_000.0);

    // Garbage input does nothing
    let (status, json) = send(&app, "POST", &uri, Some(json!({ "amount": "banyak" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["updated"].is_null());

    let (_, json) = send(&app, "GET", "/api/goals", None).await;
    assert_eq!(json[0]["currentAmount"], 2_000_000.0);
    assert_eq!(json[0]["remaining"], 8_000_000.0);
    assert_eq!(json[0]["complete"], false);
}

#[tokio::test]
async fn test_goal_validation_and_missing() {
    let (app, _) = setup_test_app();

    let (_, json) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({ "name": "Motor", "targetAmount": 0, "deadline": "2025-06-30" })),
    )
    .await;
    assert!(json["created"].is_null());

    let (_, json) = send(&app, "POST", "/api/goals", Some(json!({ "name": "Motor" }))).await;
    assert!(json["created"].is_null());

    let (status, _) = send(
        &app,
        "POST",
        "/api/goals/nope/contribute",
        Some(json!({ "amount": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Simulator ==========

#[tokio::test]
async fn test_simulate() {
    let (app, _) = setup_test_app();

    let (status, json) = send(&app, "GET", "/api/simulate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["samples"].as_array().unwrap().len(), 11);
    assert_eq!(json["samples"][0]["balance"], 1_000_000.0);

    let (_, json) = send(
        &app,
        "GET",
        "/api/simulate?initialAmount=0&monthlyContribution=0&annualReturnPercent=5&years=3",
        None,
    )
    .await;
    assert_eq!(json["finalBalance"], 0.0);
    assert!(json["roi"].is_null());

    let (status, json) = send(&app, "GET", "/api/simulate?years=1000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "years must be at most 100");
}

// ========== Session & sync ==========

#[tokio::test]
async fn test_login_me_logout() {
    let (app, sheets) = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": TOKEN })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Budi Santoso");
    assert_eq!(json["canSync"], true);
    assert!(json.get("accessToken").is_none());
    assert_eq!(sheets.spreadsheet_count(), 1);

    let (_, json) = send(&app, "GET", "/api/me", None).await;
    assert_eq!(json["user"]["email"], "budi@example.com");
    assert_eq!(json["authMethod"], "none");

    send(&app, "POST", "/api/session/logout", None).await;
    let (_, json) = send(&app, "GET", "/api/me", None).await;
    assert!(json["user"].is_null());
}

#[tokio::test]
async fn test_login_rejected_token() {
    let (app, _) = setup_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": "expired" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    assert_eq!(json[0]["kind"], "login");
    assert_eq!(json[0]["level"], "error");
}

#[tokio::test]
async fn test_login_without_spreadsheet() {
    let sheets = MockSheets::new().fail_create();
    let ctx = AppContext::open(Database::in_memory().unwrap()).unwrap();
    let app = create_router(ctx, backends(&sheets, None), None, open_config());

    let (status, json) = send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": TOKEN })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["spreadsheetId"].is_null());

    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    assert_eq!(json[0]["message"], messages::SPREADSHEET_CREATE_FAILED);
}

#[tokio::test]
async fn test_sync_requires_google_session() {
    let (app, sheets) = setup_test_app();

    let (status, _) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(&app, "POST", "/api/session/guest", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Tamu");
    assert_eq!(json["isGuest"], true);

    let (status, _) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(sheets.calls().is_empty());

    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    let notes = json.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n["message"] == messages::LOGIN_REQUIRED));

    // Drained
    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_writes_spreadsheet() {
    let (app, sheets) = setup_test_app();
    add_tx(&app, json!(8_000_000), "INCOME", "Gaji", "2024-03-01").await;
    add_tx(&app, json!(75_000), "EXPENSE", "Makanan", "2024-03-02").await;
    send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": TOKEN })),
    )
    .await;

    let (status, json) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transactions"], 2);
    assert_eq!(json["goals"], 0);

    let id = json["spreadsheetId"].as_str().unwrap();
    let rows = sheets.sheet(id, TRANSACTIONS_SHEET).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][3], "Makanan");

    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    assert_eq!(json[0]["level"], "success");
    assert_eq!(json[0]["message"], messages::SYNC_SUCCEEDED);
}

#[tokio::test]
async fn test_sync_failure_is_bad_gateway() {
    let (app, sheets) = setup_test_app();
    send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": TOKEN })),
    )
    .await;
    sheets.revoke(TOKEN);

    let (status, _) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, json) = send(&app, "GET", "/api/notifications", None).await;
    assert_eq!(json[0]["message"], messages::SYNC_FAILED);
}

// ========== Advice ==========

#[tokio::test]
async fn test_advice() {
    let (app, _) = setup_test_app();
    add_tx(&app, json!(8_000_000), "INCOME", "Gaji", "2024-03-01").await;

    let (status, json) = send(&app, "POST", "/api/advice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["summary"].as_str().unwrap().is_empty());
    assert_eq!(json["investmentAdvice"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_advice_unconfigured() {
    let sheets = MockSheets::new();
    let ctx = AppContext::open(Database::in_memory().unwrap()).unwrap();
    let app = create_router(ctx, backends(&sheets, None), None, open_config());

    let (status, json) = send(&app, "POST", "/api/advice", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "AI backend not configured");
}

// ========== Against the Google wire protocol ==========

#[tokio::test]
async fn test_login_and_sync_over_http() {
    let server = MockGoogleServer::start(TOKEN).await;
    let ctx = AppContext::open(Database::in_memory().unwrap()).unwrap();
    let backends = Backends {
        ai: None,
        sheets: Arc::new(GoogleSheetsClient::with_base_url(&server.sheets_url())),
        identity: Arc::new(GoogleIdentity::with_userinfo_url(&server.userinfo_url())),
    };
    let app = create_router(ctx, backends, None, open_config());

    add_tx(&app, json!(50_000), "EXPENSE", "Makanan", "2024-03-01").await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/session/login",
        Some(json!({ "accessToken": TOKEN })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["spreadsheetId"].is_string());

    let (status, _) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.requests();
    assert!(requests.iter().any(|r| r.starts_with("CREATE")));
    assert!(requests.contains(&"PUT Transaksi!A1".to_string()));
    assert!(requests.contains(&"PUT Tabungan!A1".to_string()));
}
