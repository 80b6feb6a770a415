use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt;
use crate::domain::entity::data_type::DataType;
use thiserror::Error;

/// NULL のレンダリング結果（どのカラム・クエリでも同じ）
pub const NULL_LITERAL: &str = "NULL";

// 値型エラーの定義
#[derive(Error, Debug, PartialEq)]
pub enum ValueError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: DataType },

    #[error("Cannot convert {0} to {1}")]
    ConversionError(String, String),
}

/// 厳密レンダリングのエラー
///
/// 通常の `render` は全域関数なのでこのエラーを返さない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unsupported value variant '{0}'")]
    Unsupported(String),
}

/// クエリ結果の1セルを表すタグ付きの値
///
/// このビルドが知らないワイヤ上の値は `Unsupported` にタグ名ごと保持する。
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Timestamp(DateTime<Utc>),
    Bytes(Bytes),
    Unsupported(String),
}

impl TypedValue {
    pub fn data_type(&self) -> DataType {
        match self {
            TypedValue::Null => DataType::Null,
            TypedValue::Bool(_) => DataType::Boolean,
            TypedValue::Int(_) => DataType::Integer,
            TypedValue::Str(_) => DataType::Varchar,
            TypedValue::Timestamp(_) => DataType::Timestamp,
            TypedValue::Bytes(_) => DataType::Blob,
            TypedValue::Unsupported(kind) => DataType::Other(kind.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// 表示用の文字列に変換する（全域・決定的）
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// 未対応のバリアントをエラーにするレンダリング
    pub fn render_strict(&self) -> Result<String, RenderError> {
        match self {
            TypedValue::Unsupported(kind) => Err(RenderError::Unsupported(kind.clone())),
            other => Ok(other.to_string()),
        }
    }

    /// 同じ型同士の値を比較する
    ///
    /// NULL を含む比較や型の異なる比較は `None`（不定）になる。
    pub fn compare(&self, other: &TypedValue) -> Option<Ordering> {
        match (self, other) {
            (TypedValue::Bool(a), TypedValue::Bool(b)) => Some(a.cmp(b)),
            (TypedValue::Int(a), TypedValue::Int(b)) => Some(a.cmp(b)),
            (TypedValue::Str(a), TypedValue::Str(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (TypedValue::Timestamp(a), TypedValue::Timestamp(b)) => Some(a.cmp(b)),
            (TypedValue::Bytes(a), TypedValue::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    //指定したデータ型に変換する
    pub fn cast_to(&self, target_type: &DataType) -> Result<TypedValue, ValueError> {
        match (self, target_type) {
            //NULLはどの型にも変換できる
            (TypedValue::Null, _) => Ok(TypedValue::Null),

            //同じ型への変換はそのまま返す
            (v, t) if &v.data_type() == t => Ok(v.clone()),

            (TypedValue::Int(i), DataType::Varchar) => Ok(TypedValue::Str(i.to_string())),
            (TypedValue::Bool(b), DataType::Varchar) => Ok(TypedValue::Str(b.to_string())),

            //文字列から他の型への変換
            (TypedValue::Str(s), DataType::Integer) => s
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|_| ValueError::ConversionError(s.to_string(), "INTEGER".to_string())),
            (TypedValue::Str(s), DataType::Boolean) => match s.to_lowercase().as_str() {
                "true" => Ok(TypedValue::Bool(true)),
                "false" => Ok(TypedValue::Bool(false)),
                _ => Err(ValueError::ConversionError(s.to_string(), "BOOLEAN".to_string())),
            },
            (TypedValue::Str(s), DataType::Timestamp) => DateTime::parse_from_rfc3339(s)
                .map(|dt| TypedValue::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| ValueError::ConversionError(s.to_string(), "TIMESTAMP".to_string())),
            (TypedValue::Str(s), DataType::Blob) => hex::decode(s)
                .map(|raw| TypedValue::Bytes(Bytes::from(raw)))
                .map_err(|_| ValueError::ConversionError(s.to_string(), "BLOB".to_string())),

            // その他の変換はエラー
            (value, target) => Err(ValueError::TypeMismatch {
                expected: target.clone(),
                actual: value.data_type(),
            }),
        }
    }
}

/// 値を表示用テキストに変換する
///
/// | 値          | 表示                                   |
/// |-------------|----------------------------------------|
/// | NULL        | `NULL`                                 |
/// | 真偽値      | `true` / `false`                       |
/// | 整数        | 10進数（負の場合のみ符号）             |
/// | 文字列      | そのまま（引用符・エスケープなし）     |
/// | タイムスタンプ | RFC 3339 UTC、マイクロ秒精度、`Z` 付き |
/// | バイト列    | 小文字の16進数（接頭辞なし）           |
/// | 未対応      | `<unsupported:タグ名>`                  |
pub fn render(value: &TypedValue) -> String {
    value.render()
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str(NULL_LITERAL),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Str(s) => f.write_str(s),
            TypedValue::Timestamp(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true)),
            TypedValue::Bytes(raw) => f.write_str(&hex::encode(raw)),
            TypedValue::Unsupported(kind) => write!(f, "<unsupported:{}>", kind),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(val: i64) -> Self {
        TypedValue::Int(val)
    }
}
impl From<String> for TypedValue {
    fn from(val: String) -> Self {
        TypedValue::Str(val)
    }
}
impl From<&str> for TypedValue {
    fn from(val: &str) -> Self {
        TypedValue::Str(val.to_string())
    }
}
impl From<bool> for TypedValue {
    fn from(val: bool) -> Self {
        TypedValue::Bool(val)
    }
}
impl From<DateTime<Utc>> for TypedValue {
    fn from(val: DateTime<Utc>) -> Self {
        TypedValue::Timestamp(val)
    }
}
impl From<Bytes> for TypedValue {
    fn from(val: Bytes) -> Self {
        TypedValue::Bytes(val)
    }
}
impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(val: Option<T>) -> Self {
        val.map_or(TypedValue::Null, Into::into)
    }
}
