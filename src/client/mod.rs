//! リモートストアへの接続（設定・HTTPトランスポート・呼び出しの期限）

pub mod config;
pub mod http;

use std::future::Future;
use std::time::Duration;

use crate::domain::repository::StoreError;

pub use config::{ClientConfig, DEFAULT_ADDR, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MS};
pub use http::HttpStore;

/// リモート呼び出しを期限付きで待つ
///
/// 期限切れは `StoreError::Transport` になる。期限切れ後のリモート側の状態は不定。
pub async fn with_deadline<T, F>(limit: Duration, call: &str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Transport(format!(
            "request timed out after {} ms ({})",
            limit.as_millis(),
            call
        ))),
    }
}
