use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::client::with_deadline;
use crate::domain::entity::{Column, DataType, ResultTable, Row};
use crate::domain::repository::{QueryReply, SqlStore};
use crate::{Error, Result};

/// ワイヤ形式の応答を検証済みの結果表に変換する
///
/// 行の値の数がカラム数と一致しない場合や、セルの中身がタグと合わない場合は
/// `MalformedResult` / `MalformedValue` になる。切り詰めや補完はしない。
pub fn decode_result(reply: QueryReply) -> Result<ResultTable> {
    let columns: Vec<Column> = reply
        .columns
        .into_iter()
        .map(|c| Column::new(c.name, DataType::from_sql_name(&c.data_type)))
        .collect();

    let mut rows = Vec::with_capacity(reply.rows.len());
    for (row_index, row) in reply.rows.iter().enumerate() {
        if row.values.len() != columns.len() {
            return Err(Error::MalformedResult {
                row: row_index,
                expected: columns.len(),
                actual: row.values.len(),
            });
        }
        let values = row
            .values
            .iter()
            .enumerate()
            .map(|(column, cell)| {
                cell.decode().map_err(|reason| Error::MalformedValue {
                    row: row_index,
                    column,
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(Row::new(values));
    }

    ResultTable::new(columns, rows)
}

/// クエリ実行ステージ
///
/// SQL はそのまま送り、1回の応答をそのまま結果とする（ページングなし）。
pub struct QueryRunner {
    store: Arc<dyn SqlStore>,
    timeout: Duration,
}

impl QueryRunner {
    pub fn new(store: Arc<dyn SqlStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn query(&self, sql: &str) -> Result<ResultTable> {
        debug!(%sql, "running query");
        let reply = with_deadline(self.timeout, "query", self.store.query(sql)).await?;
        let table = decode_result(reply)?;
        info!(columns = table.columns().len(), rows = table.len(), "query completed");
        Ok(table)
    }
}
