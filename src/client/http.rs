use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::repository::{QueryReply, SqlStore, StoreError};

pub const LOGIN_PATH: &str = "/api/login";
pub const EXEC_PATH: &str = "/api/sqlexec";
pub const QUERY_PATH: &str = "/api/sqlquery";
pub const LOGOUT_PATH: &str = "/api/logout";

/// ログインのリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

/// ログインのレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// SQL実行・クエリのリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
}

/// エラーレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<usize>,
}

/// HTTPゲートウェイ経由でリモートストアに接続する `SqlStore`
///
/// セッションのトークンは `login` で取得し、`logout` で破棄する。
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn bearer(&self) -> Result<String, StoreError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::Unauthorized("not logged in".to_string()))
    }

    async fn post<B, R>(&self, path: &str, body: &B, token: Option<&str>) -> Result<R, StoreError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("POST {} failed: {}", url, e)))?;
        let status = response.status();
        debug!(%url, %status, "gateway response");

        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| StoreError::Transport(format!("invalid response from {}: {}", url, e)));
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
            error: status.to_string(),
            statement: None,
        });
        if status == StatusCode::UNAUTHORIZED {
            Err(StoreError::Unauthorized(body.error))
        } else if status.is_server_error() {
            Err(StoreError::Transport(format!("{} from {}: {}", status, url, body.error)))
        } else {
            Err(StoreError::Rejected {
                statement: body.statement,
                message: body.error,
            })
        }
    }
}

#[async_trait]
impl SqlStore for HttpStore {
    async fn login(&self, user: &str, password: &str) -> Result<(), StoreError> {
        let request = LoginRequest {
            user: user.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post(LOGIN_PATH, &request, None).await?;
        *self.token.write().await = Some(response.token);
        Ok(())
    }

    async fn exec(&self, script: &str) -> Result<(), StoreError> {
        let token = self.bearer().await?;
        let request = SqlRequest { sql: script.to_string() };
        let _: IgnoredAny = self.post(EXEC_PATH, &request, Some(&token)).await?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryReply, StoreError> {
        let token = self.bearer().await?;
        let request = SqlRequest { sql: sql.to_string() };
        self.post(QUERY_PATH, &request, Some(&token)).await
    }

    async fn logout(&self) -> Result<(), StoreError> {
        let token = match self.token.write().await.take() {
            Some(token) => token,
            None => return Ok(()),
        };
        let _: IgnoredAny = self.post(LOGOUT_PATH, &serde_json::json!({}), Some(&token)).await?;
        Ok(())
    }
}
