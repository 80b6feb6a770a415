use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use crate::domain::entity::{Column, DataType, Row, TableError, TableSchema, TypedValue};
use crate::infrastructure::parser::{
    ColumnRef, CreateIndexStatement, CreateTableStatement, FilterCondition, FilterOperator,
    InsertStatement, Operand, ParsedStatement, Projection, SelectStatement, TableRef,
};
use thiserror::Error;

/// ストレージエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Table {0} already exists")]
    TableAlreadyExists(String),

    #[error("Column {0} not found in table {1}")]
    ColumnNotFound(String, String),

    #[error("Index on {0}({1}) already exists")]
    IndexAlreadyExists(String, String),

    #[error("Data type mismatch for column {column}: expected {expected}, got {actual}")]
    TypeMismatch { column: String, expected: DataType, actual: DataType },

    #[error("Not null constraint violation for column {0}")]
    NotNullViolation(String),

    #[error("Primary key constraint violation: key {0} already exists")]
    PrimaryKeyViolation(String),

    #[error("Values {0} and {1} are not comparable")]
    NotComparable(String, String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// スクリプト実行時の位置付きエラー（BEGIN/COMMIT は位置に数えない）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("statement {statement}: {error}")]
pub struct ScriptError {
    pub statement: usize,
    pub error: StorageError,
}

/// テーブルのデータを保持する構造体
#[derive(Debug, Clone)]
struct TableData {
    schema: TableSchema,
    // 主キーの昇順に並んだ行
    rows: Vec<Row>,
    pk_index: usize,
}

impl TableData {
    fn new(schema: TableSchema) -> Result<Self, StorageError> {
        let pk_index = schema
            .columns
            .iter()
            .position(|c| c.is_primary_key())
            .ok_or_else(|| StorageError::Internal(format!("table {} has no primary key", schema.name)))?;
        Ok(Self {
            schema,
            rows: Vec::new(),
            pk_index,
        })
    }

    fn get_column_index(&self, column_name: &str) -> Result<usize, StorageError> {
        self.schema
            .get_column_index(column_name)
            .ok_or_else(|| StorageError::ColumnNotFound(column_name.to_string(), self.schema.name.clone()))
    }

    fn validate_row(&self, row: &Row) -> Result<(), StorageError> {
        // 各カラムのデータ型と制約をチェック
        for (column, value) in self.schema.columns.iter().zip(row.iter()) {
            // NULL値のチェック
            if value.is_null() {
                if column.is_not_null() {
                    return Err(StorageError::NotNullViolation(column.name.clone()));
                }
                continue;
            }

            // データ型のチェック
            if value.data_type() != column.data_type {
                return Err(StorageError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type.clone(),
                    actual: value.data_type(),
                });
            }
        }

        Ok(())
    }

    /// 主キーで行の位置を探す（見つからなければ挿入位置）
    fn locate(&self, key: &TypedValue) -> Result<usize, usize> {
        self.rows.binary_search_by(|row| {
            row.get(self.pk_index)
                .and_then(|existing| existing.compare(key))
                .unwrap_or(Ordering::Less)
        })
    }

    fn insert_row(&mut self, row: Row, upsert: bool) -> Result<(), StorageError> {
        // 行のバリデーション
        self.validate_row(&row)?;

        let key = row.get(self.pk_index).cloned().unwrap_or(TypedValue::Null);
        match self.locate(&key) {
            Ok(position) if upsert => self.rows[position] = row,
            Ok(_) => return Err(StorageError::PrimaryKeyViolation(key.render())),
            Err(position) => self.rows.insert(position, row),
        }

        Ok(())
    }

    fn has_index(&self, columns: &[String]) -> bool {
        self.schema.indexes.iter().any(|existing| existing.as_slice() == columns)
    }
}

/// テーブルの集合（トランザクション中は複製して作業する）
#[derive(Debug, Clone, Default)]
struct Catalog {
    tables: HashMap<String, TableData>,
}

/// 結合中の1テーブル分の行の束縛
struct Binding<'a> {
    table: &'a TableRef,
    data: &'a TableData,
    row: &'a Row,
}

impl Catalog {
    fn table(&self, table_name: &str) -> Result<&TableData, StorageError> {
        self.tables
            .get(table_name)
            .ok_or_else(|| StorageError::TableNotFound(table_name.to_string()))
    }

    fn apply(&mut self, statement: &ParsedStatement, now: DateTime<Utc>) -> Result<(), StorageError> {
        match statement {
            ParsedStatement::CreateTable(create) => self.create_table(create),
            ParsedStatement::CreateIndex(index) => self.create_index(index),
            ParsedStatement::Insert(insert) => self.insert_rows(insert, now),
            // スクリプト内のSELECTは結果を返さない
            ParsedStatement::Select(select) => self.select_rows(select, now).map(|_| ()),
            ParsedStatement::Begin | ParsedStatement::Commit => {
                Err(StorageError::Internal("transaction control reached catalog".to_string()))
            }
        }
    }

    /// テーブルを作成する
    fn create_table(&mut self, create: &CreateTableStatement) -> Result<(), StorageError> {
        if self.tables.contains_key(&create.schema.name) {
            if create.if_not_exists {
                return Ok(());
            }
            return Err(StorageError::TableAlreadyExists(create.schema.name.clone()));
        }

        let data = TableData::new(create.schema.clone())?;
        self.tables.insert(create.schema.name.clone(), data);
        Ok(())
    }

    /// インデックスを作成する（行の検索には使わず、定義のみ保持する）
    fn create_index(&mut self, index: &CreateIndexStatement) -> Result<(), StorageError> {
        let table_data = self
            .tables
            .get_mut(&index.table_name)
            .ok_or_else(|| StorageError::TableNotFound(index.table_name.clone()))?;

        if table_data.has_index(&index.columns) {
            if index.if_not_exists {
                return Ok(());
            }
            return Err(StorageError::IndexAlreadyExists(index.table_name.clone(), index.columns.join(", ")));
        }

        table_data
            .schema
            .add_index(index.columns.iter().cloned())
            .map_err(|e| match e {
                TableError::ColumnNotFound(missing) => StorageError::ColumnNotFound(missing, index.table_name.clone()),
                other => StorageError::Internal(other.to_string()),
            })
    }

    /// 行を挿入する（UPSERTの場合は主キーが一致する行を置き換える）
    fn insert_rows(&mut self, insert: &InsertStatement, now: DateTime<Utc>) -> Result<(), StorageError> {
        let table_data = self
            .tables
            .get_mut(&insert.table_name)
            .ok_or_else(|| StorageError::TableNotFound(insert.table_name.clone()))?;

        let positions = insert
            .columns
            .iter()
            .map(|name| table_data.get_column_index(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(insert.rows.len());
        for operands in &insert.rows {
            let mut values = vec![TypedValue::Null; table_data.schema.columns.len()];
            for (position, operand) in positions.iter().zip(operands) {
                values[*position] = match operand {
                    Operand::Literal(value) => value.clone(),
                    Operand::Now => TypedValue::Timestamp(now),
                    Operand::Column(column) => {
                        return Err(StorageError::Internal(format!("column {} used as a value", column.name)))
                    }
                };
            }
            rows.push(Row::new(values));
        }

        // 複数行の場合は文全体を原子的に適用する
        if rows.len() == 1 {
            return table_data.insert_row(rows.remove(0), insert.upsert);
        }
        let mut staged = table_data.clone();
        for row in rows {
            staged.insert_row(row, insert.upsert)?;
        }
        *table_data = staged;
        Ok(())
    }

    /// 行を検索する
    fn select_rows(
        &self,
        select: &SelectStatement,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Column>, Vec<Row>), StorageError> {
        let driving = self.table(&select.from.name)?;
        let joined = match &select.join {
            Some(join) => Some((&join.table, self.table(&join.table.name)?, &join.on)),
            None => None,
        };

        let columns = self.projected_columns(select, driving, joined.map(|(t, d, _)| (t, d)))?;

        let mut rows = Vec::new();
        for row in &driving.rows {
            let first = Binding { table: &select.from, data: driving, row };
            let candidates: Vec<Vec<Binding>> = match joined {
                None => vec![vec![first]],
                Some((table, data, on)) => {
                    let mut matched = Vec::new();
                    for other in &data.rows {
                        let bindings = vec![
                            Binding { table: &select.from, data: driving, row },
                            Binding { table, data, row: other },
                        ];
                        if eval_filter(on, &bindings, now)? == Some(true) {
                            matched.push(bindings);
                        }
                    }
                    matched
                }
            };

            for bindings in candidates {
                let keep = match &select.filter {
                    Some(filter) => eval_filter(filter, &bindings, now)? == Some(true),
                    None => true,
                };
                if keep {
                    rows.push(project(select, &bindings)?);
                }
            }

            if select.limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
        }

        if let Some(limit) = select.limit {
            rows.truncate(limit);
        }

        Ok((columns, rows))
    }

    fn projected_columns(
        &self,
        select: &SelectStatement,
        driving: &TableData,
        joined: Option<(&TableRef, &TableData)>,
    ) -> Result<Vec<Column>, StorageError> {
        let sources: Vec<(&TableRef, &TableData)> =
            std::iter::once((&select.from, driving)).chain(joined).collect();

        match &select.projection {
            Projection::Wildcard => Ok(sources
                .iter()
                .flat_map(|(_, data)| data.schema.columns.iter())
                .map(|c| Column::new(c.name.clone(), c.data_type.clone()))
                .collect()),
            Projection::Items(items) => items
                .iter()
                .map(|item| {
                    let (source, index) = resolve_in(&sources, &item.column)?;
                    let column = &sources[source].1.schema.columns[index];
                    let name = item.alias.clone().unwrap_or_else(|| column.name.clone());
                    Ok(Column::new(name, column.data_type.clone()))
                })
                .collect(),
        }
    }
}

/// カラム参照を (ソース位置, カラム位置) に解決する
///
/// 修飾子のない参照は FROM 句の順で最初に見つかったテーブルのカラムになる。
fn resolve_in(sources: &[(&TableRef, &TableData)], column: &ColumnRef) -> Result<(usize, usize), StorageError> {
    for (source, (table, data)) in sources.iter().enumerate() {
        if let Some(qualifier) = &column.qualifier {
            if !table.matches(qualifier) {
                continue;
            }
            return data.get_column_index(&column.name).map(|index| (source, index));
        }
        if let Some(index) = data.schema.get_column_index(&column.name) {
            return Ok((source, index));
        }
    }

    let table = column.qualifier.clone().unwrap_or_else(|| {
        sources.first().map(|(t, _)| t.name.clone()).unwrap_or_default()
    });
    Err(StorageError::ColumnNotFound(column.name.clone(), table))
}

fn lookup<'a>(bindings: &'a [Binding<'a>], column: &ColumnRef) -> Result<&'a TypedValue, StorageError> {
    let sources: Vec<(&TableRef, &TableData)> = bindings.iter().map(|b| (b.table, b.data)).collect();
    let (source, index) = resolve_in(&sources, column)?;
    bindings[source]
        .row
        .get(index)
        .ok_or_else(|| StorageError::Internal(format!("row is missing column {}", column.name)))
}

fn operand_value(operand: &Operand, bindings: &[Binding], now: DateTime<Utc>) -> Result<TypedValue, StorageError> {
    match operand {
        Operand::Column(column) => lookup(bindings, column).cloned(),
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Now => Ok(TypedValue::Timestamp(now)),
    }
}

/// 条件を3値論理で評価する（`None` は不定）
///
/// NULL を含む比較はすべて不定になり、WHERE では偽として扱われる。
fn eval_filter(filter: &FilterCondition, bindings: &[Binding], now: DateTime<Utc>) -> Result<Option<bool>, StorageError> {
    match filter {
        FilterCondition::Compare { left, operator, right } => {
            let left = operand_value(left, bindings, now)?;
            let right = operand_value(right, bindings, now)?;
            if left.is_null() || right.is_null() {
                return Ok(None);
            }
            let ordering = left
                .compare(&right)
                .ok_or_else(|| StorageError::NotComparable(left.render(), right.render()))?;
            Ok(Some(match operator {
                FilterOperator::Equal => ordering == Ordering::Equal,
                FilterOperator::NotEqual => ordering != Ordering::Equal,
                FilterOperator::Greater => ordering == Ordering::Greater,
                FilterOperator::GreaterOrEqual => ordering != Ordering::Less,
                FilterOperator::Less => ordering == Ordering::Less,
                FilterOperator::LessOrEqual => ordering != Ordering::Greater,
            }))
        },
        FilterCondition::IsNull { operand, negated } => {
            let value = operand_value(operand, bindings, now)?;
            Ok(Some(value.is_null() != *negated))
        },
        FilterCondition::And(conditions) => {
            let mut result = Some(true);
            for condition in conditions {
                match eval_filter(condition, bindings, now)? {
                    Some(false) => return Ok(Some(false)),
                    None => result = None,
                    Some(true) => {}
                }
            }
            Ok(result)
        },
        FilterCondition::Or(conditions) => {
            let mut result = Some(false);
            for condition in conditions {
                match eval_filter(condition, bindings, now)? {
                    Some(true) => return Ok(Some(true)),
                    None => result = None,
                    Some(false) => {}
                }
            }
            Ok(result)
        },
        FilterCondition::Not(inner) => Ok(eval_filter(inner, bindings, now)?.map(|b| !b)),
    }
}

fn project(select: &SelectStatement, bindings: &[Binding]) -> Result<Row, StorageError> {
    let values = match &select.projection {
        Projection::Wildcard => bindings.iter().flat_map(|b| b.row.iter().cloned()).collect(),
        Projection::Items(items) => items
            .iter()
            .map(|item| lookup(bindings, &item.column).cloned())
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(Row::new(values))
}

/// インメモリストレージの実装
#[derive(Debug, Default)]
pub struct MemoryStorage {
    catalog: RwLock<Catalog>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Catalog>, StorageError> {
        self.catalog
            .read()
            .map_err(|_| StorageError::Internal("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Catalog>, StorageError> {
        self.catalog
            .write()
            .map_err(|_| StorageError::Internal("catalog lock poisoned".to_string()))
    }

    /// 解析済みスクリプトを実行する
    ///
    /// BEGIN〜COMMIT の間はカタログの複製に適用し、COMMIT で入れ替える。途中で失敗した
    /// 場合や COMMIT がない場合は複製を捨てる。枠の外の文はそれぞれ即座に反映され、
    /// 最初の失敗で実行を止める。
    pub fn execute_script(&self, statements: &[ParsedStatement]) -> Result<usize, ScriptError> {
        let mut catalog = self.write().map_err(|error| ScriptError { statement: 0, error })?;
        let now = Utc::now();
        let mut staged: Option<Catalog> = None;
        let mut position = 0;

        for statement in statements {
            match statement {
                ParsedStatement::Begin => {
                    if staged.is_some() {
                        return Err(ScriptError {
                            statement: position,
                            error: StorageError::Transaction("nested transactions are not supported".to_string()),
                        });
                    }
                    staged = Some(catalog.clone());
                }
                ParsedStatement::Commit => match staged.take() {
                    Some(committed) => *catalog = committed,
                    None => {
                        return Err(ScriptError {
                            statement: position,
                            error: StorageError::Transaction("no transaction in progress".to_string()),
                        })
                    }
                },
                other => {
                    let target = match staged.as_mut() {
                        Some(staged) => staged,
                        None => &mut *catalog,
                    };
                    target
                        .apply(other, now)
                        .map_err(|error| ScriptError { statement: position, error })?;
                    position += 1;
                }
            }
        }

        if staged.is_some() {
            return Err(ScriptError {
                statement: position,
                error: StorageError::Transaction("transaction was not committed".to_string()),
            });
        }

        Ok(position)
    }

    /// 行を検索する
    pub fn select_rows(&self, select: &SelectStatement) -> Result<(Vec<Column>, Vec<Row>), StorageError> {
        self.read()?.select_rows(select, Utc::now())
    }

    /// テーブルが存在するか確認する
    pub fn table_exists(&self, table_name: &str) -> Result<bool, StorageError> {
        Ok(self.read()?.tables.contains_key(table_name))
    }

    /// テーブルのスキーマを取得する
    pub fn get_table(&self, table_name: &str) -> Result<TableSchema, StorageError> {
        Ok(self.read()?.table(table_name)?.schema.clone())
    }

    /// テーブルの行数を取得する
    pub fn row_count(&self, table_name: &str) -> Result<usize, StorageError> {
        Ok(self.read()?.table(table_name)?.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parser::SqlParser;

    fn run(storage: &MemoryStorage, script: &str) -> Result<usize, ScriptError> {
        let statements = SqlParser::new().parse_script(script).unwrap();
        storage.execute_script(&statements)
    }

    fn query(storage: &MemoryStorage, sql: &str) -> Result<(Vec<Column>, Vec<Row>), StorageError> {
        let select = SqlParser::new().parse_query(sql).unwrap();
        storage.select_rows(&select)
    }

    fn seeded() -> MemoryStorage {
        let storage = MemoryStorage::new();
        run(
            &storage,
            "BEGIN TRANSACTION;
             CREATE TABLE Clients (id INTEGER, name VARCHAR, deactive BOOLEAN, PRIMARY KEY (id));
             CREATE INDEX ON Clients(name);
             COMMIT;",
        )
        .unwrap();
        storage
    }

    #[test]
    fn transaction_commits_all_statements() {
        let storage = seeded();
        assert!(storage.table_exists("Clients").unwrap());
        assert_eq!(storage.get_table("Clients").unwrap().indexes, vec![vec!["name".to_string()]]);
    }

    #[test]
    fn failed_transaction_rolls_back_everything() {
        let storage = seeded();
        let err = run(
            &storage,
            "BEGIN; CREATE TABLE Products (id INTEGER, PRIMARY KEY (id)); CREATE INDEX ON Products(missing); COMMIT;",
        )
        .unwrap_err();
        assert_eq!(err.statement, 1);
        assert!(matches!(err.error, StorageError::ColumnNotFound(..)));
        assert!(!storage.table_exists("Products").unwrap());
    }

    #[test]
    fn missing_commit_discards_staged_changes() {
        let storage = seeded();
        let err = run(&storage, "BEGIN; CREATE TABLE Products (id INTEGER, PRIMARY KEY (id));").unwrap_err();
        assert!(matches!(err.error, StorageError::Transaction(_)));
        assert!(!storage.table_exists("Products").unwrap());
    }

    #[test]
    fn autocommit_statements_stop_at_first_failure() {
        let storage = seeded();
        let err = run(
            &storage,
            "UPSERT INTO Clients (id, name) VALUES (1, 'a');
             UPSERT INTO Clients (id, name) VALUES (2, 3);
             UPSERT INTO Clients (id, name) VALUES (3, 'c');",
        )
        .unwrap_err();
        assert_eq!(err.statement, 1);
        assert!(matches!(err.error, StorageError::TypeMismatch { .. }));
        assert_eq!(storage.row_count("Clients").unwrap(), 1);
    }

    #[test]
    fn upsert_replaces_and_insert_rejects_duplicate_keys() {
        let storage = seeded();
        run(&storage, "UPSERT INTO Clients (id, name) VALUES (1, 'a')").unwrap();
        run(&storage, "UPSERT INTO Clients (id, name) VALUES (1, 'b')").unwrap();
        assert_eq!(storage.row_count("Clients").unwrap(), 1);
        let (_, rows) = query(&storage, "SELECT name FROM Clients").unwrap();
        assert_eq!(rows[0].values, vec![TypedValue::from("b")]);

        let err = run(&storage, "INSERT INTO Clients (id, name) VALUES (1, 'c')").unwrap_err();
        assert_eq!(err.error, StorageError::PrimaryKeyViolation("1".into()));
        let err = run(&storage, "UPSERT INTO Clients (id, name) VALUES (NULL, 'c')").unwrap_err();
        assert_eq!(err.error, StorageError::NotNullViolation("id".into()));
    }

    #[test]
    fn duplicate_table_respects_if_not_exists() {
        let storage = seeded();
        run(&storage, "CREATE TABLE IF NOT EXISTS Clients (id INTEGER, PRIMARY KEY (id))").unwrap();
        let err = run(&storage, "CREATE TABLE Clients (id INTEGER, PRIMARY KEY (id))").unwrap_err();
        assert_eq!(err.error, StorageError::TableAlreadyExists("Clients".into()));
        let err = run(&storage, "CREATE INDEX ON Clients(name)").unwrap_err();
        assert!(matches!(err.error, StorageError::IndexAlreadyExists(..)));
        run(&storage, "CREATE INDEX IF NOT EXISTS ON Clients(name)").unwrap();
    }

    #[test]
    fn rows_come_back_in_primary_key_order() {
        let storage = seeded();
        for id in [5, 1, 3] {
            run(&storage, &format!("UPSERT INTO Clients (id, name) VALUES ({}, 'c{}')", id, id)).unwrap();
        }
        let (columns, rows) = query(&storage, "SELECT * FROM Clients LIMIT 2").unwrap();
        assert_eq!(columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["id", "name", "deactive"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values[0], TypedValue::Int(1));
        assert_eq!(rows[1].values[0], TypedValue::Int(3));
    }

    #[test]
    fn null_comparisons_are_unknown() {
        let storage = seeded();
        run(&storage, "UPSERT INTO Clients (id, name) VALUES (1, 'a')").unwrap();
        run(&storage, "UPSERT INTO Clients (id, name, deactive) VALUES (2, 'b', TRUE)").unwrap();

        let (_, rows) = query(&storage, "SELECT id FROM Clients WHERE deactive != NULL").unwrap();
        assert!(rows.is_empty());
        let (_, rows) = query(&storage, "SELECT id FROM Clients WHERE deactive = NULL").unwrap();
        assert!(rows.is_empty());
        let (_, rows) = query(&storage, "SELECT id FROM Clients WHERE deactive IS NOT NULL").unwrap();
        assert_eq!(rows.len(), 1);
        let (_, rows) = query(&storage, "SELECT id FROM Clients WHERE NOT (deactive = TRUE)").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn comparing_different_types_is_an_error() {
        let storage = seeded();
        run(&storage, "UPSERT INTO Clients (id, name) VALUES (1, 'a')").unwrap();
        let err = query(&storage, "SELECT id FROM Clients WHERE name < 3").unwrap_err();
        assert!(matches!(err, StorageError::NotComparable(..)));
    }

    #[test]
    fn inner_join_resolves_unqualified_columns_to_driving_table() {
        let storage = seeded();
        run(&storage, "CREATE TABLE Orders (id INTEGER, ts TIMESTAMP, client_id INTEGER, PRIMARY KEY (id))").unwrap();
        run(&storage, "UPSERT INTO Clients (id, name) VALUES (1, 'one'); UPSERT INTO Clients (id, name) VALUES (2, 'two')").unwrap();
        run(&storage, "UPSERT INTO Orders (id, ts, client_id) VALUES (10, NOW(), 2); UPSERT INTO Orders (id, ts, client_id) VALUES (11, NOW(), 1)").unwrap();

        let (columns, rows) = query(
            &storage,
            "SELECT id, c.name AS client_name FROM Orders INNER JOIN Clients AS c ON client_id = c.id",
        )
        .unwrap();
        assert_eq!(columns[1].name, "client_name");
        assert_eq!(columns[1].data_type, DataType::Varchar);
        assert_eq!(
            rows.iter().map(|r| r.values.clone()).collect::<Vec<_>>(),
            vec![
                vec![TypedValue::Int(10), TypedValue::from("two")],
                vec![TypedValue::Int(11), TypedValue::from("one")],
            ]
        );
    }

    #[test]
    fn unknown_tables_and_columns_are_reported() {
        let storage = seeded();
        assert_eq!(query(&storage, "SELECT id FROM Nope").unwrap_err(), StorageError::TableNotFound("Nope".into()));
        assert!(matches!(query(&storage, "SELECT nope FROM Clients").unwrap_err(), StorageError::ColumnNotFound(..)));
    }
}
