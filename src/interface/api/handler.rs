use axum::{
    extract::{Extension, Json},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::http::{ErrorBody, LoginRequest, LoginResponse, SqlRequest};
use crate::domain::repository::{QueryReply, SqlStore, StoreError};

/// API エラー
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody { error: msg, statement: None }),
            ApiError::Store(StoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, ErrorBody { error: msg, statement: None })
            }
            ApiError::Store(StoreError::Rejected { statement, message }) => {
                (StatusCode::BAD_REQUEST, ErrorBody { error: message, statement })
            }
            ApiError::Store(StoreError::Transport(msg)) => {
                (StatusCode::BAD_GATEWAY, ErrorBody { error: msg, statement: None })
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody { error: msg, statement: None }),
        };

        (status, Json(body)).into_response()
    }
}

/// ゲートウェイの共有状態
///
/// 背後のストアへのログインが成功するたびにトークンを発行する。
pub struct GatewayState {
    store: Arc<dyn SqlStore>,
    sessions: Mutex<HashSet<String>>,
    issued: AtomicU64,
}

impl GatewayState {
    pub fn new(store: Arc<dyn SqlStore>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashSet::new()),
            issued: AtomicU64::new(0),
        }
    }

    fn issue_token(&self) -> Result<String, ApiError> {
        let serial = self.issued.fetch_add(1, Ordering::SeqCst);
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let token = format!("{:016x}{:08x}", nanos, serial);
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session table poisoned".to_string()))?
            .insert(token.clone());
        Ok(token)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<String, ApiError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session table poisoned".to_string()))?;
        if sessions.contains(token) {
            Ok(token.to_string())
        } else {
            Err(ApiError::Unauthorized("unknown or expired token".to_string()))
        }
    }

    fn revoke(&self, token: &str) -> Result<(), ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session table poisoned".to_string()))?
            .remove(token);
        Ok(())
    }
}

/// ヘルスチェックハンドラー
pub async fn health_check_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// ログインハンドラー
pub async fn login_handler(
    Extension(state): Extension<Arc<GatewayState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if let Err(err) = state.store.login(&payload.user, &payload.password).await {
        warn!(user = %payload.user, "login rejected");
        return Err(err.into());
    }
    let token = state.issue_token()?;
    Ok(Json(LoginResponse { token }))
}

/// SQL実行ハンドラー
pub async fn exec_handler(
    Extension(state): Extension<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(payload): Json<SqlRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.authorize(&headers)?;
    debug!(bytes = payload.sql.len(), "exec");
    state.store.exec(&payload.sql).await?;
    Ok(Json(json!({})))
}

/// クエリハンドラー
pub async fn query_handler(
    Extension(state): Extension<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(payload): Json<SqlRequest>,
) -> Result<Json<QueryReply>, ApiError> {
    state.authorize(&headers)?;
    debug!(sql = %payload.sql, "query");
    let reply = state.store.query(&payload.sql).await?;
    Ok(Json(reply))
}

/// ログアウトハンドラー（トークンだけを破棄する）
pub async fn logout_handler(
    Extension(state): Extension<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state.authorize(&headers)?;
    state.revoke(&token)?;
    Ok(Json(json!({})))
}
