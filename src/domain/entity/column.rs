use crate::domain::entity::data_type::{DataType, Constraint};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use std::fmt;

/// テーブル定義またはクエリ結果のカラム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Column {
    /// カラム名（結果セットでは重複もありうる）
    #[builder(setter(into))]
    pub name: String,

    /// データ型
    pub data_type: DataType,

    /// 制約
    #[builder(default)]
    pub constraints: Vec<Constraint>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: Vec::new(),
        }
    }

    // primary key constraint
    pub fn primary_key(mut self) -> Self {
        self.constraints.push(Constraint::PrimaryKey);
        self.constraints.push(Constraint::NotNull); // primary key は not null 制約を持つ
        self
    }

    // NOT NULL constraint
    pub fn not_null(mut self) -> Self {
        if !self.constraints.contains(&Constraint::NotNull) {
            self.constraints.push(Constraint::NotNull);
        }
        self
    }

    /// このカラムがプライマリキーかどうかをチェックする
    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&Constraint::PrimaryKey)
    }

    /// このカラムがNOT NULL制約を持つかどうかをチェックする
    pub fn is_not_null(&self) -> bool {
        self.constraints.contains(&Constraint::NotNull)
    }

    /// CREATE TABLE 内のカラム定義
    ///
    /// 主キーはテーブル制約として別に出力するので、ここでは NOT NULL のみ付ける。
    pub fn definition_sql(&self) -> String {
        if self.is_not_null() && !self.is_primary_key() {
            format!("{} {} NOT NULL", self.name, self.data_type)
        } else {
            format!("{} {}", self.name, self.data_type)
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        for constraint in &self.constraints {
            write!(f, " {}", constraint)?;
        }
        Ok(())
    }
}
