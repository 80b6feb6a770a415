use std::sync::Arc;
use std::time::Duration;

use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::client::with_deadline;
use crate::domain::entity::TableSchema;
use crate::domain::repository::{SqlStore, StoreError};
use crate::{Error, Result};

/// 既存のテーブルに対する DDL の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ProvisionMode {
    /// `IF NOT EXISTS` 付きで発行する（再実行しても成功する）
    #[default]
    IfNotExists,
    /// そのまま発行する（再実行すると最初の CREATE TABLE で失敗する）
    Strict,
}

impl ProvisionMode {
    fn if_not_exists(self) -> bool {
        matches!(self, ProvisionMode::IfNotExists)
    }
}

/// 1つのトランザクションで作成するテーブルのまとまり
#[derive(Debug, Clone, PartialEq)]
pub struct DdlGroup {
    pub name: String,
    pub tables: Vec<TableSchema>,
}

impl DdlGroup {
    pub fn new(name: impl Into<String>, tables: Vec<TableSchema>) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }

    /// グループ内の文を順番に返す（テーブルごとに CREATE TABLE、続けて CREATE INDEX）
    pub fn statements(&self, mode: ProvisionMode) -> Vec<String> {
        self.tables
            .iter()
            .flat_map(|table| table.ddl_statements(mode.if_not_exists()))
            .collect()
    }

    /// `BEGIN TRANSACTION; ... COMMIT;` で囲んだスクリプト
    pub fn script(&self, mode: ProvisionMode) -> String {
        let mut script = String::from("BEGIN TRANSACTION;\n");
        for statement in self.statements(mode) {
            script.push_str("  ");
            script.push_str(&statement);
            script.push_str(";\n");
        }
        script.push_str("COMMIT;\n");
        script
    }
}

/// スキーマ作成ステージ
pub struct SchemaProvisioner {
    store: Arc<dyn SqlStore>,
    mode: ProvisionMode,
    timeout: Duration,
}

impl SchemaProvisioner {
    pub fn new(store: Arc<dyn SqlStore>, mode: ProvisionMode, timeout: Duration) -> Self {
        Self { store, mode, timeout }
    }

    /// グループを1つのスクリプトとして原子的に作成する
    ///
    /// 失敗した場合はグループ内のどのテーブルも作成されない。再試行はしない。
    pub async fn provision(&self, group: &DdlGroup) -> Result<()> {
        let statements = self.statements_checked(group)?;
        let script = group.script(self.mode);

        match with_deadline(self.timeout, "exec", self.store.exec(&script)).await {
            Ok(()) => {
                info!(group = %group.name, statements = statements.len(), mode = %self.mode, "schema group committed");
                Ok(())
            }
            Err(err) if err.is_transport() => Err(err.into()),
            Err(StoreError::Rejected { statement, message }) => {
                let sql = statement.and_then(|index| statements.get(index).cloned());
                warn!(group = %group.name, ?statement, ?sql, %message, "schema group rejected");
                Err(Error::Schema {
                    group: group.name.clone(),
                    statement,
                    sql,
                    message,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    fn statements_checked(&self, group: &DdlGroup) -> Result<Vec<String>> {
        if group.tables.is_empty() {
            return Err(Error::Config(format!("schema group '{}' has no tables", group.name)));
        }
        for table in &group.tables {
            table
                .validate()
                .map_err(|e| Error::Config(format!("table {} in group '{}': {}", table.name, group.name, e)))?;
        }
        Ok(group.statements(self.mode))
    }
}
