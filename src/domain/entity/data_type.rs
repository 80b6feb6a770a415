use derive_more::Display;
use strum::EnumString;
use serde::{Deserialize, Serialize};
use std::fmt;


/// ストアがサポートするカラムのデータ型
///
/// ワイヤ上の型名を解釈できない場合は `Other` に元の名前を保持する。
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum DataType {
    #[display(fmt = "INTEGER")]
    #[strum(serialize = "INTEGER", serialize = "INT", serialize = "BIGINT")]
    Integer,

    #[display(fmt = "VARCHAR")]
    #[strum(serialize = "VARCHAR", serialize = "STRING", serialize = "TEXT", serialize = "CHAR")]
    Varchar,

    #[display(fmt = "BOOLEAN")]
    #[strum(serialize = "BOOLEAN", serialize = "BOOL")]
    Boolean,

    #[display(fmt = "TIMESTAMP")]
    #[strum(serialize = "TIMESTAMP", serialize = "DATETIME")]
    Timestamp,

    #[display(fmt = "BLOB")]
    #[strum(serialize = "BLOB", serialize = "BYTEA", serialize = "BINARY")]
    Blob,

    #[display(fmt = "NULL")]
    #[strum(serialize = "NULL", serialize = "ANY")]
    Null,

    #[display(fmt = "{}", _0)]
    #[strum(default)]
    Other(String),
}

impl DataType {
    /// `VARCHAR(256)` のような長さ指定付きの型名も受け付ける
    pub fn from_sql_name(name: &str) -> Self {
        let base = name.split('(').next().unwrap_or(name).trim();
        base.parse().unwrap_or_else(|_| DataType::Other(base.to_string()))
    }

    /// このクライアントが値を生成・格納できる型かどうか
    pub fn is_storable(&self) -> bool {
        !matches!(self, DataType::Null | DataType::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    // 主キー制約
    PrimaryKey,
    // NOT NULL 制約
    NotNull,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::PrimaryKey => write!(f, "PRIMARY KEY"),
            Constraint::NotNull => write!(f, "NOT NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("INTEGER", DataType::Integer)]
    #[test_case("integer", DataType::Integer)]
    #[test_case("VARCHAR(256)", DataType::Varchar)]
    #[test_case("Boolean", DataType::Boolean)]
    #[test_case("TIMESTAMP", DataType::Timestamp)]
    #[test_case("BLOB", DataType::Blob)]
    #[test_case("ANY", DataType::Null)]
    fn parses_wire_type_names(name: &str, expected: DataType) {
        assert_eq!(DataType::from_sql_name(name), expected);
    }

    #[test]
    fn unknown_type_names_are_kept() {
        let data_type = DataType::from_sql_name("JSON");
        assert_eq!(data_type, DataType::Other("JSON".to_string()));
        assert_eq!(data_type.to_string(), "JSON");
        assert!(!data_type.is_storable());
    }

    #[test]
    fn displays_canonical_names() {
        assert_eq!(DataType::Varchar.to_string(), "VARCHAR");
        assert_eq!(DataType::Timestamp.to_string(), "TIMESTAMP");
        assert_eq!(Constraint::NotNull.to_string(), "NOT NULL");
    }
}
