//! Test utilities for jagadoku-core
//!
//! Mock HTTP servers standing in for Google (Sheets + userinfo) and the AI
//! backends, for development and integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Serve `app` on an ephemeral port until the returned sender fires
async fn spawn(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

/// Insight JSON returned by the mock AI servers
pub fn sample_insight_json() -> Value {
    json!({
        "summary": "Keuangan Anda sehat dengan surplus bulanan yang stabil.",
        "savingTips": [
            "Kurangi makan di luar menjadi dua kali seminggu.",
            "Bawa bekal ke kantor.",
            "Gunakan transportasi umum."
        ],
        "investmentAdvice": [
            {"instrument": "Reksadana Pasar Uang", "description": "Untuk dana darurat.", "riskLevel": "Low"},
            {"instrument": "Emas", "description": "Lindung nilai inflasi.", "riskLevel": "Medium"}
        ]
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Google (Sheets + userinfo)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct GoogleState {
    valid_token: String,
    requests: Arc<Mutex<Vec<String>>>,
    created: Arc<AtomicUsize>,
    /// Sheet name whose writes are answered with 500
    failing_sheet: Option<String>,
}

/// Mock Google API: spreadsheets under `/sheets`, userinfo under `/oauth2/v3/userinfo`
pub struct MockGoogleServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGoogleServer {
    /// Start a server that accepts only `valid_token`
    pub async fn start(valid_token: &str) -> Self {
        Self::start_inner(valid_token, None).await
    }

    /// Start a server whose writes to `sheet` fail with 500
    pub async fn start_failing_writes(valid_token: &str, sheet: &str) -> Self {
        Self::start_inner(valid_token, Some(sheet.to_string())).await
    }

    async fn start_inner(valid_token: &str, failing_sheet: Option<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = GoogleState {
            valid_token: valid_token.to_string(),
            requests: requests.clone(),
            created: Arc::new(AtomicUsize::new(0)),
            failing_sheet,
        };

        let app = Router::new()
            .route("/oauth2/v3/userinfo", get(handle_userinfo))
            .route("/sheets", post(handle_create))
            .route(
                "/sheets/:id/values/:range",
                post(handle_clear).put(handle_write),
            )
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;
        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL to hand to `GoogleSheetsClient`
    pub fn sheets_url(&self) -> String {
        format!("{}/sheets", self.url())
    }

    /// URL to hand to `GoogleIdentity`
    pub fn userinfo_url(&self) -> String {
        format!("{}/oauth2/v3/userinfo", self.url())
    }

    /// Requests seen so far, e.g. `"CREATE JagaDoku - ..."`, `"PUT Transaksi!A1"`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGoogleServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn google_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": "ERROR" }
        })),
    )
        .into_response()
}

fn authorized(state: &GoogleState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.valid_token);
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn unauthorized() -> Response {
    google_error(
        StatusCode::UNAUTHORIZED,
        "Request had invalid authentication credentials. Invalid Credentials",
    )
}

async fn handle_userinfo(State(state): State<GoogleState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({
        "sub": "1234567890",
        "name": "Budi Santoso",
        "email": "budi@example.com",
        "picture": "https://example.com/budi.png"
    }))
    .into_response()
}

async fn handle_create(
    State(state): State<GoogleState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let title = body["properties"]["title"].as_str().unwrap_or_default();
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("CREATE {}", title));

    let n = state.created.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "spreadsheetId": format!("sheet-{}", n), "properties": body["properties"] }))
        .into_response()
}

async fn handle_clear(
    State(state): State<GoogleState>,
    headers: HeaderMap,
    Path((_id, range)): Path<(String, String)>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let range = range.trim_end_matches(":clear").to_string();
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("CLEAR {}", range));
    Json(json!({ "clearedRange": range })).into_response()
}

#[derive(Deserialize)]
struct WriteBody {
    values: Vec<Vec<Value>>,
}

async fn handle_write(
    State(state): State<GoogleState>,
    headers: HeaderMap,
    Path((_id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<WriteBody>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if query.get("valueInputOption").map(String::as_str) != Some("RAW") {
        return google_error(StatusCode::BAD_REQUEST, "valueInputOption is required");
    }
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("PUT {}", range));

    let sheet = range.split('!').next().unwrap_or_default();
    if state.failing_sheet.as_deref() == Some(sheet) {
        return google_error(StatusCode::INTERNAL_SERVER_ERROR, "Backend error");
    }

    Json(json!({ "updatedRange": range, "updatedRows": body.values.len() })).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// AI backends (Ollama + Gemini)
// ─────────────────────────────────────────────────────────────────────────────

/// What the mock AI server answers with
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AIResponseMode {
    /// A valid insight
    Valid,
    /// Prose with no JSON
    Malformed,
    /// HTTP 500
    Error,
}

#[derive(Clone)]
struct AIState {
    mode: AIResponseMode,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Mock AI server speaking both the Ollama and Gemini protocols
pub struct MockAIServer {
    addr: SocketAddr,
    prompts: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAIServer {
    pub async fn start() -> Self {
        Self::start_with(AIResponseMode::Valid).await
    }

    pub async fn start_with(mode: AIResponseMode) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = AIState {
            mode,
            prompts: prompts.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_ollama_generate))
            .route(
                "/v1beta/models/:model",
                get(handle_gemini_model).post(handle_gemini_generate),
            )
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;
        Self {
            addr,
            prompts,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// User prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn answer_text(mode: AIResponseMode) -> String {
    match mode {
        AIResponseMode::Valid => sample_insight_json().to_string(),
        _ => "Maaf, saya tidak dapat menganalisis data ini.".to_string(),
    }
}

async fn handle_tags() -> Json<Value> {
    Json(json!({ "models": [{ "name": "llama3.2:latest" }] }))
}

async fn handle_ollama_generate(
    State(state): State<AIState>,
    Json(request): Json<Value>,
) -> Response {
    let prompt = request["prompt"].as_str().unwrap_or_default().to_string();
    state.prompts.lock().unwrap().push(prompt);

    if state.mode == AIResponseMode::Error {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    Json(json!({
        "model": request["model"],
        "response": answer_text(state.mode),
        "done": true
    }))
    .into_response()
}

async fn handle_gemini_model(Path(model): Path<String>) -> Json<Value> {
    Json(json!({ "name": format!("models/{}", model) }))
}

async fn handle_gemini_generate(
    State(state): State<AIState>,
    headers: HeaderMap,
    Path(model_action): Path<String>,
    Json(request): Json<Value>,
) -> Response {
    if !model_action.ends_with(":generateContent") {
        return (StatusCode::NOT_FOUND, "unknown action").into_response();
    }
    if headers.get("x-goog-api-key").is_none() {
        return (StatusCode::FORBIDDEN, "missing api key").into_response();
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    state.prompts.lock().unwrap().push(prompt);

    if state.mode == AIResponseMode::Error {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "message": "internal" } })),
        )
            .into_response();
    }

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": answer_text(state.mode) }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}
