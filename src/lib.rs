pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod interface;
pub mod client;

use crate::domain::entity::RenderError;

// ledgersql version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// client result type
pub type Result<T> = std::result::Result<T, Error>;

/// クライアント全体のエラー分類
///
/// 各ステージ（スキーマ作成・取り込み・クエリ）は失敗をそのまま呼び出し元へ返す。
/// 中断・スキップ・再試行の判断は呼び出し側（`main` のオーケストレーター）が行う。
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    /// `statement` はストアが位置を返さなかった場合 `None`
    #[error("Schema error in group '{group}'{}: {message}", failing_statement(.statement, .sql))]
    Schema {
        group: String,
        statement: Option<usize>,
        sql: Option<String>,
        message: String,
    },

    #[error("Ingest error in table {table}: row {failed_row} (key {key}) failed after {committed} committed rows: {message}")]
    Ingest {
        table: String,
        committed: usize,
        failed_row: usize,
        key: String,
        message: String,
    },

    #[error("Malformed result: row {row} has {actual} values but {expected} columns")]
    MalformedResult {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed value in row {row}, column {column}: {reason}")]
    MalformedValue {
        row: usize,
        column: usize,
        reason: String,
    },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Result has no columns")]
    EmptyProjection,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn failing_statement(statement: &Option<usize>, sql: &Option<String>) -> String {
    match (statement, sql) {
        (Some(index), Some(sql)) => format!(" at statement {} ({})", index, sql),
        (Some(index), None) => format!(" at statement {}", index),
        _ => String::new(),
    }
}

impl Error {
    /// プロセス終了コード（エラー分類ごと）
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 1,
            Error::Transport(_) => 2,
            Error::Schema { .. } => 3,
            Error::Ingest { .. } => 4,
            Error::MalformedResult { .. }
            | Error::MalformedValue { .. }
            | Error::Query(_)
            | Error::Render(_)
            | Error::EmptyProjection => 5,
        }
    }

    /// 取り込みを再開できる位置（成功済み行数）を返す
    pub fn resume_from(&self) -> Option<usize> {
        match self {
            Error::Ingest { committed, .. } => Some(*committed),
            _ => None,
        }
    }
}
