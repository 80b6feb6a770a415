use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;

use crate::domain::entity::Column;
use crate::domain::repository::{QueryReply, SqlStore, StoreError, WireColumn, WireRow, WireValue};
use crate::infrastructure::parser::SqlParser;
use crate::infrastructure::storage::{MemoryStorage, StorageError};

pub const DEFAULT_USER: &str = "immudb";
pub const DEFAULT_PASSWORD: &str = "immudb";

/// インメモリストアの実装
///
/// リモートストアと同じ `SqlStore` 境界を持つプロセス内のストア。
/// ローカルゲートウェイと `--embedded` 実行、テストで使う。
pub struct MemoryStore {
    storage: Arc<MemoryStorage>,
    parser: SqlParser,
    user: String,
    password: String,
    authenticated: AtomicBool,
}

impl MemoryStore {
    pub fn new(storage: Arc<MemoryStorage>) -> Self {
        Self::with_credentials(storage, DEFAULT_USER, DEFAULT_PASSWORD)
    }

    pub fn with_credentials(storage: Arc<MemoryStorage>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            storage,
            parser: SqlParser::new(),
            user: user.into(),
            password: password.into(),
            authenticated: AtomicBool::new(false),
        }
    }

    /// 共有しているストレージ
    pub fn storage(&self) -> &Arc<MemoryStorage> {
        &self.storage
    }

    fn ensure_session(&self) -> Result<(), StoreError> {
        if self.authenticated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized("no active session".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::rejected(err.to_string())
    }
}

#[async_trait]
impl SqlStore for MemoryStore {
    async fn login(&self, user: &str, password: &str) -> Result<(), StoreError> {
        if user != self.user || password != self.password {
            return Err(StoreError::Unauthorized(format!("invalid credentials for user {}", user)));
        }
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn exec(&self, script: &str) -> Result<(), StoreError> {
        self.ensure_session()?;
        let statements = self
            .parser
            .parse_script(script)
            .map_err(|e| StoreError::at_statement(e.statement, e.error.to_string()))?;
        let applied = self
            .storage
            .execute_script(&statements)
            .map_err(|e| StoreError::at_statement(e.statement, e.error.to_string()))?;
        debug!(statements = applied, "script applied");
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryReply, StoreError> {
        self.ensure_session()?;
        let select = self
            .parser
            .parse_query(sql)
            .map_err(|e| StoreError::rejected(e.to_string()))?;
        let (columns, rows) = self.storage.select_rows(&select)?;

        Ok(QueryReply {
            columns: columns.iter().map(wire_column).collect(),
            rows: rows
                .iter()
                .map(|row| WireRow {
                    values: row.iter().map(WireValue::encode).collect(),
                })
                .collect(),
        })
    }

    async fn logout(&self) -> Result<(), StoreError> {
        self.ensure_session()?;
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }
}

fn wire_column(column: &Column) -> WireColumn {
    WireColumn {
        name: column.name.clone(),
        data_type: column.data_type.to_string(),
    }
}
