//! Session handlers: who is signed in, Google login, guest mode, logout

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use jagadoku_core::app::authenticate;
use jagadoku_core::models::UserSession;

use crate::{auth_method, AppError, AppState, SuccessResponse};

/// Session as exposed over HTTP; the access token never leaves the server
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub name: String,
    pub email: String,
    pub picture: String,
    pub spreadsheet_id: Option<String>,
    pub is_guest: bool,
    pub can_sync: bool,
}

impl From<&UserSession> for SessionView {
    fn from(s: &UserSession) -> Self {
        Self {
            name: s.name.clone(),
            email: s.email.clone(),
            picture: s.picture.clone(),
            spreadsheet_id: s.spreadsheet_id.clone(),
            is_guest: s.is_guest,
            can_sync: s.can_sync(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: Option<SessionView>,
    /// How the API caller authenticated
    pub auth_method: &'static str,
}

/// GET /api/me - Current session, if any
pub async fn get_me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<MeResponse> {
    let ctx = state.ctx.lock().await;
    Json(MeResponse {
        user: ctx.session().map(SessionView::from),
        auth_method: auth_method(&headers),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// OAuth access token from the browser sign-in
    pub access_token: String,
}

/// POST /api/session/login - Sign in with a Google access token
///
/// Reuses the spreadsheet of the previous session, or provisions one. A
/// provisioning failure still signs the user in, without a spreadsheet.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    let existing = state.ctx.lock().await.known_spreadsheet_id();

    // No lock held across the Google calls
    let result = authenticate(
        &body.access_token,
        state.identity.as_ref(),
        state.sheets.as_ref(),
        existing,
    )
    .await;

    let mut ctx = state.ctx.lock().await;
    let session = match result {
        Ok(outcome) => ctx.complete_login(outcome)?,
        Err(e) => return Err(ctx.fail_login(e).into()),
    };
    Ok(Json(SessionView::from(&session)))
}

#[derive(Debug, Deserialize)]
pub struct GuestRequest {
    #[serde(default)]
    pub name: String,
}

/// POST /api/session/guest - Start a local-only session
pub async fn login_as_guest(
    State(state): State<Arc<AppState>>,
    body: Option<Json<GuestRequest>>,
) -> Result<Json<SessionView>, AppError> {
    let name = body.map(|Json(b)| b.name).unwrap_or_default();
    let session = state.ctx.lock().await.login_as_guest(&name)?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/session/logout - End the session; the ledger is kept
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<SuccessResponse>, AppError> {
    state.ctx.lock().await.logout()?;
    Ok(Json(SuccessResponse { success: true }))
}
