use crate::domain::entity::column::Column;
use crate::domain::entity::value::TypedValue;
use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column '{0}' already exists in table")]
    ColumnAlreadyExists(String),

    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    #[error("Table must have at least one column")]
    NoColumns,

    #[error("Table must declare a primary key")]
    NoPrimaryKey,

    #[error("Multiple primary keys not allowed")]
    MultiplePrimaryKeys,

    #[error("Index must cover at least one column")]
    EmptyIndex,
}

/// テーブルのスキーマ（カラム定義とインデックス）
///
/// クライアントはこの定義から DDL 文を生成するだけで、整合性はストア側が保証する。
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    // table name
    pub name: String,

    // table columns
    pub columns: Vec<Column>,

    // indexed column lists, in declaration order
    pub indexes: Vec<Vec<String>>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), TableError> {
        // 同名のカラムが既に存在するかチェック
        if self.get_column(&column.name).is_some() {
            return Err(TableError::ColumnAlreadyExists(column.name));
        }
        // 既にプライマリキーが存在する場合、新しいカラムがプライマリキーであればエラー
        if column.is_primary_key() && self.get_primary_key().is_some() {
            return Err(TableError::MultiplePrimaryKeys);
        }

        self.columns.push(column);
        Ok(())
    }

    /// ビルダーパターンでカラムを追加する
    pub fn with_column(mut self, column: Column) -> Result<Self, TableError> {
        self.add_column(column)?;
        Ok(self)
    }

    /// インデックスを追加する（カラムは定義済みである必要がある）
    pub fn add_index<I, S>(&mut self, columns: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(TableError::EmptyIndex);
        }
        if let Some(missing) = columns.iter().find(|c| self.get_column(c).is_none()) {
            return Err(TableError::ColumnNotFound(missing.clone()));
        }
        self.indexes.push(columns);
        Ok(())
    }

    pub fn with_index<I, S>(mut self, columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_index(columns)?;
        Ok(self)
    }

    /// 名前でカラムを検索する
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// プライマリキーのカラムを取得する
    pub fn get_primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary_key())
    }

    /// カラムの位置インデックスを取得する
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// テーブルのカラム名のリストを取得する
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// テーブルが有効かチェックする
    pub fn validate(&self) -> Result<(), TableError> {
        if self.columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        if self.get_primary_key().is_none() {
            return Err(TableError::NoPrimaryKey);
        }
        Ok(())
    }

    /// CREATE TABLE 文を生成する
    pub fn create_table_sql(&self, if_not_exists: bool) -> String {
        let mut definitions = self.columns.iter().map(Column::definition_sql).collect::<Vec<_>>();
        if let Some(pk) = self.get_primary_key() {
            definitions.push(format!("PRIMARY KEY ({})", pk.name));
        }
        format!(
            "CREATE TABLE {}{} ({})",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            self.name,
            definitions.join(", ")
        )
    }

    /// CREATE INDEX 文を宣言順に生成する
    pub fn create_index_sql(&self, if_not_exists: bool) -> Vec<String> {
        self.indexes
            .iter()
            .map(|columns| {
                format!(
                    "CREATE INDEX {}ON {}({})",
                    if if_not_exists { "IF NOT EXISTS " } else { "" },
                    self.name,
                    columns.iter().join(", ")
                )
            })
            .collect()
    }

    /// テーブル作成とインデックス作成の DDL をこの順で返す
    pub fn ddl_statements(&self, if_not_exists: bool) -> Vec<String> {
        std::iter::once(self.create_table_sql(if_not_exists))
            .chain(self.create_index_sql(if_not_exists))
            .collect()
    }
}

/// 1行のデータ（カラム順に並んだ値）
///
/// 同名カラムがありうるので、名前ではなく位置で値を扱う。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<TypedValue>,
}

impl Row {
    pub fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    /// 位置で値を取得する
    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedValue> {
        self.values.iter()
    }
}

impl From<Vec<TypedValue>> for Row {
    fn from(values: Vec<TypedValue>) -> Self {
        Self::new(values)
    }
}

/// クエリ結果（カラムと行）
///
/// `new` で全行の値の数がカラム数と一致することを検証するので、
/// 検証されていない結果がレンダリングに渡ることはない。
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> crate::Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(crate::Error::MalformedResult {
                    row: index,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    //行数を取得する
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    // 結果セットが空かどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 指定カラムの値を行順に取り出す
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &TypedValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}
