//! リモートストアのクエリ結果のワイヤ形式（JSON）
//!
//! セルは1つのキーだけを持つオブジェクトで、キーが値の種類を表す:
//! `{"null":null}` `{"b":true}` `{"n":1}` `{"s":"x"}` `{"ts":<UNIXマイクロ秒>}` `{"bs":"<hex>"}`。
//! 64bit整数は文字列でも届くことがある（`{"n":"1"}`）。

use bytes::Bytes;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::entity::TypedValue;

pub const TAG_NULL: &str = "null";
pub const TAG_BOOL: &str = "b";
pub const TAG_INT: &str = "n";
pub const TAG_STR: &str = "s";
pub const TAG_TIMESTAMP: &str = "ts";
pub const TAG_BYTES: &str = "bs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireValue(pub Map<String, JsonValue>);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireRow {
    pub values: Vec<WireValue>,
}

/// クエリ応答
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryReply {
    pub columns: Vec<WireColumn>,
    #[serde(default)]
    pub rows: Vec<WireRow>,
}

impl WireValue {
    fn tagged(tag: &str, payload: JsonValue) -> Self {
        let mut map = Map::new();
        map.insert(tag.to_string(), payload);
        WireValue(map)
    }

    /// 値をワイヤ形式に変換する
    pub fn encode(value: &TypedValue) -> Self {
        match value {
            TypedValue::Null => Self::tagged(TAG_NULL, JsonValue::Null),
            TypedValue::Bool(b) => Self::tagged(TAG_BOOL, JsonValue::Bool(*b)),
            TypedValue::Int(i) => Self::tagged(TAG_INT, JsonValue::from(*i)),
            TypedValue::Str(s) => Self::tagged(TAG_STR, JsonValue::String(s.clone())),
            TypedValue::Timestamp(dt) => Self::tagged(TAG_TIMESTAMP, JsonValue::from(dt.timestamp_micros())),
            TypedValue::Bytes(raw) => Self::tagged(TAG_BYTES, JsonValue::String(hex::encode(raw))),
            TypedValue::Unsupported(kind) => Self::tagged(kind, JsonValue::Null),
        }
    }

    /// ワイヤ形式から値を復元する
    ///
    /// 未知のタグは `Unsupported` になる。タグと中身の型が合わない場合はエラー。
    pub fn decode(&self) -> Result<TypedValue, String> {
        let mut entries = self.0.iter();
        let (tag, payload) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err("cell has no value tag".to_string()),
            (Some(_), Some(_)) => {
                return Err(format!("cell has {} value tags, expected exactly one", self.0.len()))
            }
        };

        match tag.as_str() {
            TAG_NULL => Ok(TypedValue::Null),
            TAG_BOOL => payload
                .as_bool()
                .map(TypedValue::Bool)
                .ok_or_else(|| format!("expected boolean payload, got {}", payload)),
            TAG_INT => int_payload(payload).map(TypedValue::Int),
            TAG_STR => payload
                .as_str()
                .map(|s| TypedValue::Str(s.to_string()))
                .ok_or_else(|| format!("expected string payload, got {}", payload)),
            TAG_TIMESTAMP => {
                let micros = int_payload(payload)?;
                DateTime::from_timestamp_micros(micros)
                    .map(TypedValue::Timestamp)
                    .ok_or_else(|| format!("timestamp {} out of range", micros))
            }
            TAG_BYTES => payload
                .as_str()
                .ok_or_else(|| format!("expected hex string payload, got {}", payload))
                .and_then(|s| hex::decode(s).map_err(|e| format!("invalid hex payload: {}", e)))
                .map(|raw| TypedValue::Bytes(Bytes::from(raw))),
            other => Ok(TypedValue::Unsupported(other.to_string())),
        }
    }
}

fn int_payload(payload: &JsonValue) -> Result<i64, String> {
    match payload {
        JsonValue::Number(n) => n.as_i64().ok_or_else(|| format!("integer {} out of range", n)),
        JsonValue::String(s) => s.parse().map_err(|_| format!("invalid integer payload '{}'", s)),
        other => Err(format!("expected integer payload, got {}", other)),
    }
}

impl From<&TypedValue> for WireValue {
    fn from(value: &TypedValue) -> Self {
        WireValue::encode(value)
    }
}
