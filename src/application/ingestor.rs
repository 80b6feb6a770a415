use std::sync::Arc;
use std::time::Duration;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::client::with_deadline;
use crate::domain::entity::{TableSchema, TypedValue};
use crate::domain::repository::{SqlStore, StoreError};
use crate::{Error, Result};

/// UPSERT に渡す値
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertValue {
    Value(TypedValue),
    /// サーバー側の `NOW()`
    Now,
}

impl UpsertValue {
    /// SQLリテラルとして書き出す
    pub fn to_sql(&self) -> String {
        match self {
            UpsertValue::Value(value) => sql_literal(value),
            UpsertValue::Now => "NOW()".to_string(),
        }
    }
}

impl From<TypedValue> for UpsertValue {
    fn from(value: TypedValue) -> Self {
        UpsertValue::Value(value)
    }
}

macro_rules! upsert_value_from {
    ($($t:ty),*) => {
        $(impl From<$t> for UpsertValue {
            fn from(value: $t) -> Self {
                UpsertValue::Value(value.into())
            }
        })*
    };
}

upsert_value_from!(i64, bool, String, &str, chrono::DateTime<chrono::Utc>, bytes::Bytes);

/// 型付きの値をSQLリテラルに変換する
///
/// 文字列は単一引用符で囲み、中の `'` は二重にする。
pub fn sql_literal(value: &TypedValue) -> String {
    match value {
        TypedValue::Null => "NULL".to_string(),
        TypedValue::Bool(true) => "TRUE".to_string(),
        TypedValue::Bool(false) => "FALSE".to_string(),
        TypedValue::Int(i) => i.to_string(),
        TypedValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        TypedValue::Timestamp(_) => format!("CAST('{}' AS TIMESTAMP)", value.render()),
        TypedValue::Bytes(raw) => format!("x'{}'", hex::encode(raw)),
        // 取り込み前に `check_rows` で弾くので、ここに来るのは直接呼ばれた場合だけ
        TypedValue::Unsupported(kind) => format!("<unsupported:{}>", kind),
    }
}

/// 1行分のUPSERT（指定したカラムだけを書き込む）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpsertRow {
    values: Vec<(String, UpsertValue)>,
}

impl UpsertRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<UpsertValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    pub fn get(&self, column: &str) -> Option<&UpsertValue> {
        self.values.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// `UPSERT INTO t (cols) VALUES (literals)`
    pub fn to_sql(&self, table: &str) -> String {
        format!(
            "UPSERT INTO {} ({}) VALUES ({})",
            table,
            self.columns().join(", "),
            self.values.iter().map(|(_, value)| value.to_sql()).join(", ")
        )
    }
}

/// 取り込みステージ
///
/// 行は呼び出し順に送り、最初の失敗で止まる。それまでに送った行は
/// ロールバックしない（UPSERTは冪等なので、失敗位置から再開できる）。
pub struct BatchIngestor {
    store: Arc<dyn SqlStore>,
    chunk_size: usize,
    timeout: Duration,
}

impl BatchIngestor {
    pub fn new(store: Arc<dyn SqlStore>, chunk_size: usize, timeout: Duration) -> Self {
        Self {
            store,
            chunk_size,
            timeout,
        }
    }

    /// すべての行を取り込み、取り込んだ行数を返す
    pub async fn ingest(&self, table: &TableSchema, rows: &[UpsertRow]) -> Result<usize> {
        self.resume(table, rows, 0).await
    }

    /// `from` 番目の行から取り込みを再開する
    ///
    /// エラーに含まれる行番号は `rows` 全体での位置。成功時は `rows.len()` を返す。
    pub async fn resume(&self, table: &TableSchema, rows: &[UpsertRow], from: usize) -> Result<usize> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".to_string()));
        }
        if from > rows.len() {
            return Err(Error::Config(format!(
                "cannot resume {} at row {}: only {} rows",
                table.name,
                from,
                rows.len()
            )));
        }
        self.check_rows(table, rows)?;

        let mut chunk_start = from;
        for chunk in rows[from..].chunks(self.chunk_size) {
            let script = chunk.iter().map(|row| format!("{};", row.to_sql(&table.name))).join("\n");
            debug!(table = %table.name, first_row = chunk_start, rows = chunk.len(), "sending upsert chunk");

            if let Err(err) = with_deadline(self.timeout, "exec", self.store.exec(&script)).await {
                return Err(self.failure(table, rows, chunk_start, chunk.len(), err));
            }
            chunk_start += chunk.len();
        }

        info!(table = %table.name, rows = rows.len() - from, "table ingested");
        Ok(rows.len())
    }

    /// 送信前に全行を検査する
    ///
    /// ストアはスクリプト全体を解析してから実行するため、書き込めない値が
    /// チャンクに混ざると、その前の行もコミットされない。
    fn check_rows(&self, table: &TableSchema, rows: &[UpsertRow]) -> Result<()> {
        for (index, row) in rows.iter().enumerate() {
            for (column, value) in &row.values {
                if table.get_column(column).is_none() {
                    return Err(Error::Config(format!(
                        "row {} of {} sets unknown column {}",
                        index, table.name, column
                    )));
                }
                if let UpsertValue::Value(value) = value {
                    value.render_strict().map_err(|e| {
                        Error::Config(format!("row {} of {} cannot write column {}: {}", index, table.name, column, e))
                    })?;
                }
            }
        }
        Ok(())
    }

    fn failure(&self, table: &TableSchema, rows: &[UpsertRow], chunk_start: usize, chunk_len: usize, err: StoreError) -> Error {
        if err.is_transport() {
            return err.into();
        }
        // 位置が返らない場合、チャンク内の何行がコミットされたかは分からない。
        // コミット済みはチャンクの先頭までとし、再開時にチャンク全体を送り直す（UPSERTなので重複しない）。
        let offset = err.statement().unwrap_or(0).min(chunk_len.saturating_sub(1));
        let failed_row = chunk_start + offset;
        let key = primary_key_text(table, &rows[failed_row]);
        let message = match err {
            StoreError::Rejected { message, .. } => message,
            other => other.to_string(),
        };

        warn!(table = %table.name, committed = failed_row, failed_row, %key, %message, "ingestion stopped");
        Error::Ingest {
            table: table.name.clone(),
            committed: failed_row,
            failed_row,
            key,
            message,
        }
    }
}

fn primary_key_text(table: &TableSchema, row: &UpsertRow) -> String {
    table
        .get_primary_key()
        .and_then(|pk| row.get(&pk.name))
        .map(|value| match value {
            UpsertValue::Value(v) => v.render(),
            UpsertValue::Now => "NOW()".to_string(),
        })
        .unwrap_or_else(|| "<missing>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Column, DataType};
    use crate::domain::repository::MockSqlStore;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use test_case::test_case;

    fn clients() -> TableSchema {
        TableSchema::new("Clients")
            .with_column(Column::new("id", DataType::Integer).primary_key())
            .and_then(|t| t.with_column(Column::new("name", DataType::Varchar)))
            .and_then(|t| t.with_column(Column::new("deactive", DataType::Boolean)))
            .unwrap()
    }

    fn rows(n: i64) -> Vec<UpsertRow> {
        (0..n).map(|i| UpsertRow::new().set("id", i).set("name", format!("client{}", i))).collect()
    }

    #[test_case(TypedValue::Null, "NULL" ; "null value")]
    #[test_case(TypedValue::Bool(true), "TRUE" ; "bool true")]
    #[test_case(TypedValue::Bool(false), "FALSE" ; "bool false")]
    #[test_case(TypedValue::Int(-42), "-42" ; "negative int")]
    #[test_case(TypedValue::from("O'Brien"), "'O''Brien'" ; "quoted string")]
    #[test_case(TypedValue::Bytes(Bytes::from_static(&[0xde, 0xad])), "x'dead'" ; "bytes")]
    #[test_case(
        TypedValue::Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        "CAST('2024-03-01T12:00:00.000000Z' AS TIMESTAMP)" ; "timestamp"
    )]
    fn literal_encoding(value: TypedValue, expected: &str) {
        assert_eq!(sql_literal(&value), expected);
    }

    #[test]
    fn upsert_lists_only_set_columns() {
        let row = UpsertRow::new().set("id", 1i64).set("ts", UpsertValue::Now).set("client_id", 7i64);
        assert_eq!(row.to_sql("Orders"), "UPSERT INTO Orders (id, ts, client_id) VALUES (1, NOW(), 7)");
    }

    #[tokio::test]
    async fn stops_at_first_failing_row() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let recorded = sent.clone();
        let mut store = MockSqlStore::new();
        store.expect_exec().times(4).returning(move |script| {
            recorded.lock().unwrap().push(script.to_string());
            if script.contains("VALUES (3,") {
                Err(StoreError::at_statement(0, "constraint violated"))
            } else {
                Ok(())
            }
        });

        let ingestor = BatchIngestor::new(Arc::new(store), 1, Duration::from_secs(1));
        let err = ingestor.ingest(&clients(), &rows(10)).await.unwrap_err();

        match &err {
            Error::Ingest { table, committed, failed_row, key, message } => {
                assert_eq!(table, "Clients");
                assert_eq!(*committed, 3);
                assert_eq!(*failed_row, 3);
                assert_eq!(key, "3");
                assert_eq!(message, "constraint violated");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(err.resume_from(), Some(3));
        // 失敗した行より後ろは送られない
        assert_eq!(sent.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn chunk_failure_is_attributed_to_the_row() {
        let mut store = MockSqlStore::new();
        let mut calls = 0;
        store.expect_exec().times(2).returning(move |script| {
            calls += 1;
            assert_eq!(script.lines().count(), 4);
            if calls == 2 {
                Err(StoreError::at_statement(2, "boom"))
            } else {
                Ok(())
            }
        });

        let ingestor = BatchIngestor::new(Arc::new(store), 4, Duration::from_secs(1));
        let err = ingestor.ingest(&clients(), &rows(10)).await.unwrap_err();
        assert!(matches!(err, Error::Ingest { committed: 6, failed_row: 6, .. }));
    }

    #[tokio::test]
    async fn resume_continues_from_committed_row() {
        let mut store = MockSqlStore::new();
        store
            .expect_exec()
            .times(2)
            .withf(|script: &str| !script.contains("VALUES (0,"))
            .returning(|_| Ok(()));

        let ingestor = BatchIngestor::new(Arc::new(store), 1, Duration::from_secs(1));
        assert_eq!(ingestor.resume(&clients(), &rows(3), 1).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rejects_bad_configuration_before_sending() {
        let store = MockSqlStore::new();
        let ingestor = BatchIngestor::new(Arc::new(store), 0, Duration::from_secs(1));
        assert!(matches!(ingestor.ingest(&clients(), &rows(1)).await, Err(Error::Config(_))));

        let store = MockSqlStore::new();
        let ingestor = BatchIngestor::new(Arc::new(store), 1, Duration::from_secs(1));
        let bad = vec![UpsertRow::new().set("id", 1i64).set("nope", 2i64)];
        assert!(matches!(ingestor.ingest(&clients(), &bad).await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn unsupported_values_are_rejected_before_any_chunk_is_sent() {
        let store = MockSqlStore::new();
        let ingestor = BatchIngestor::new(Arc::new(store), 4, Duration::from_secs(1));
        let mut rows = rows(4);
        rows[2] = UpsertRow::new().set("id", 2i64).set("name", TypedValue::Unsupported("f".into()));

        let err = ingestor.ingest(&clients(), &rows).await.unwrap_err();
        match &err {
            Error::Config(message) => {
                assert!(message.contains("row 2"));
                assert!(message.contains("name"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(err.resume_from(), None);
    }

    #[tokio::test]
    async fn chunk_failure_without_position_commits_nothing_of_that_chunk() {
        let mut store = MockSqlStore::new();
        let mut calls = 0;
        store.expect_exec().times(2).returning(move |_| {
            calls += 1;
            if calls == 2 {
                Err(StoreError::rejected("script rejected"))
            } else {
                Ok(())
            }
        });

        let ingestor = BatchIngestor::new(Arc::new(store), 4, Duration::from_secs(1));
        let err = ingestor.ingest(&clients(), &rows(10)).await.unwrap_err();
        match &err {
            Error::Ingest { committed, failed_row, key, .. } => {
                assert_eq!((*committed, *failed_row), (4, 4));
                assert_eq!(key, "4");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(err.resume_from(), Some(4));
    }

    #[tokio::test]
    async fn transport_errors_are_not_ingest_errors() {
        let mut store = MockSqlStore::new();
        store.expect_exec().returning(|_| Err(StoreError::Transport("connection reset".into())));
        let ingestor = BatchIngestor::new(Arc::new(store), 1, Duration::from_secs(1));
        let err = ingestor.ingest(&clients(), &rows(2)).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
