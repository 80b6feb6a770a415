use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer, TokenizerError, Word};
use sqlparser::ast::{
    BinaryOperator, Expr, Ident, JoinConstraint, JoinOperator, ObjectName, Query, SelectItem,
    SetExpr, Statement, TableConstraint, TableFactor, TableWithJoins, UnaryOperator,
    Value as SqlValue,
};

use bytes::Bytes;
use crate::domain::entity::{Column, DataType, TableSchema, TypedValue};
use thiserror::Error;

/// SQL解析エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("SQL syntax error: {0}")]
    SyntaxError(String),

    #[error("Unsupported SQL feature: {0}")]
    UnsupportedFeature(String),

    #[error("Invalid data type: {0}")]
    InvalidDataType(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid table definition: {0}")]
    InvalidTable(String),
}

impl From<ParserError> for ParseError {
    fn from(err: ParserError) -> Self {
        ParseError::SyntaxError(err.to_string())
    }
}

impl From<TokenizerError> for ParseError {
    fn from(err: TokenizerError) -> Self {
        ParseError::SyntaxError(err.to_string())
    }
}

/// スクリプト中の位置付き解析エラー（BEGIN/COMMIT は位置に数えない）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("statement {statement}: {error}")]
pub struct ScriptParseError {
    pub statement: usize,
    pub error: ParseError,
}

/// カラム参照（`name` または `qualifier.name`）
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

/// 式の項
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnRef),
    Literal(TypedValue),
    /// `NOW()`：文の実行時刻
    Now,
}

/// フィルター演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// WHERE句・JOIN条件
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    Compare {
        left: Operand,
        operator: FilterOperator,
        right: Operand,
    },
    IsNull {
        operand: Operand,
        negated: bool,
    },
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

/// FROM/JOIN のテーブル参照
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// 修飾子がこのテーブルを指すかどうか（別名があれば別名、なければテーブル名）
    pub fn matches(&self, qualifier: &str) -> bool {
        match &self.alias {
            Some(alias) => alias == qualifier,
            None => self.name == qualifier,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: TableRef,
    pub on: FilterCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItemRef {
    pub column: ColumnRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Wildcard,
    Items(Vec<SelectItemRef>),
}

/// CREATE TABLE文からの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub schema: TableSchema,
    pub if_not_exists: bool,
}

/// CREATE INDEX文からの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub table_name: String,
    pub columns: Vec<String>,
    pub if_not_exists: bool,
}

/// INSERT/UPSERT文からの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Operand>>,
    pub upsert: bool,
}

/// SELECT文からの解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub from: TableRef,
    pub join: Option<JoinClause>,
    pub filter: Option<FilterCondition>,
    pub limit: Option<usize>,
}

/// 解析されたSQL文
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    Begin,
    Commit,
    CreateTable(CreateTableStatement),
    CreateIndex(CreateIndexStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
}

/// インメモリストア用のSQLパーサー
///
/// クライアントが発行する文の範囲（トランザクション枠、CREATE TABLE/INDEX、
/// UPSERT/INSERT、単純なSELECTと1つの内部結合）だけを扱う。
pub struct SqlParser {
    dialect: GenericDialect,
}

impl SqlParser {
    /// 新しいSQLパーサーを作成する
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// スクリプト全体を解析する（実行前にすべて解析する）
    pub fn parse_script(&self, script: &str) -> Result<Vec<ParsedStatement>, ScriptParseError> {
        let tokens = Tokenizer::new(&self.dialect, script)
            .tokenize()
            .map_err(|e| ScriptParseError { statement: 0, error: e.into() })?;

        let mut parsed_statements = Vec::new();
        let mut position = 0;
        for chunk in split_statements(tokens) {
            let parsed = self
                .parse_chunk(chunk)
                .map_err(|error| ScriptParseError { statement: position, error })?;
            if !matches!(parsed, ParsedStatement::Begin | ParsedStatement::Commit) {
                position += 1;
            }
            parsed_statements.push(parsed);
        }

        Ok(parsed_statements)
    }

    /// 単一のSELECT文を解析する
    pub fn parse_query(&self, sql: &str) -> Result<SelectStatement, ParseError> {
        let tokens = Tokenizer::new(&self.dialect, sql).tokenize()?;
        let mut chunks = split_statements(tokens).into_iter();
        match (chunks.next(), chunks.next()) {
            (Some(chunk), None) => match self.parse_chunk(chunk)? {
                ParsedStatement::Select(select) => Ok(select),
                _ => Err(ParseError::UnsupportedFeature("Only SELECT statements can be queried".to_string())),
            },
            (None, _) => Err(ParseError::SyntaxError("Empty query".to_string())),
            (Some(_), Some(_)) => Err(ParseError::UnsupportedFeature("Multiple statements in a query".to_string())),
        }
    }

    /// セミコロンで区切られた1文分のトークンを解析する
    fn parse_chunk(&self, mut tokens: Vec<Token>) -> Result<ParsedStatement, ParseError> {
        let words = leading_words(&tokens, 2);
        match words.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["BEGIN", ..] => Ok(ParsedStatement::Begin),
            ["COMMIT", ..] => Ok(ParsedStatement::Commit),
            ["CREATE", "INDEX"] => parse_create_index(&tokens),
            ["UPSERT", ..] => {
                // UPSERT は INSERT として解析し、主キーでの置き換えとして扱う
                if let Some(first) = tokens.iter_mut().find(|t| !matches!(t, Token::Whitespace(_))) {
                    *first = Token::make_keyword("INSERT");
                }
                match self.parse_tokens(tokens)? {
                    ParsedStatement::Insert(insert) => Ok(ParsedStatement::Insert(InsertStatement { upsert: true, ..insert })),
                    _ => Err(ParseError::SyntaxError("Malformed UPSERT statement".to_string())),
                }
            }
            _ => self.parse_tokens(tokens),
        }
    }

    fn parse_tokens(&self, tokens: Vec<Token>) -> Result<ParsedStatement, ParseError> {
        let mut statements = Parser::new(&self.dialect).with_tokens(tokens).parse_statements()?;
        if statements.len() != 1 {
            return Err(ParseError::SyntaxError("Expected exactly one statement".to_string()));
        }
        self.parse_statement(statements.remove(0))
    }

    /// 単一のSQL文を解析する
    fn parse_statement(&self, stmt: Statement) -> Result<ParsedStatement, ParseError> {
        match stmt {
            Statement::StartTransaction { .. } => Ok(ParsedStatement::Begin),
            Statement::Commit { .. } => Ok(ParsedStatement::Commit),
            Statement::CreateTable { name, columns, constraints, if_not_exists, .. } => {
                self.parse_create_table(name, columns, constraints, if_not_exists)
            },
            Statement::Query(query) => {
                self.parse_select(*query).map(ParsedStatement::Select)
            },
            Statement::Insert { table_name, columns, source, .. } => {
                if let SetExpr::Values(values) = source.body.as_ref() {
                    self.parse_insert(table_name, columns, values.rows.clone())
                } else {
                    Err(ParseError::UnsupportedFeature("Only VALUES in INSERT are supported".to_string()))
                }
            },
            _ => Err(ParseError::UnsupportedFeature("Unsupported SQL statement type".to_string()))
        }
    }

    /// CREATE TABLE文を解析する
    fn parse_create_table(
        &self,
        name: ObjectName,
        columns: Vec<sqlparser::ast::ColumnDef>,
        constraints: Vec<TableConstraint>,
        if_not_exists: bool,
    ) -> Result<ParsedStatement, ParseError> {
        let table_name = self.object_name_to_string(&name)?;

        let mut parsed_columns = Vec::new();
        for col in columns {
            let data_type = DataType::from_sql_name(&col.data_type.to_string());
            if !data_type.is_storable() {
                return Err(ParseError::InvalidDataType(format!("Unsupported data type: {}", col.data_type)));
            }

            let mut column = Column::new(col.name.value.clone(), data_type);

            // 制約の解析
            for constraint in &col.options {
                match constraint.option {
                    sqlparser::ast::ColumnOption::NotNull => {
                        column = column.not_null();
                    },
                    sqlparser::ast::ColumnOption::Unique { is_primary: true, .. } => {
                        column = column.primary_key();
                    },
                    _ => {
                        return Err(ParseError::UnsupportedFeature(
                            format!("Unsupported column option on {}", col.name.value)));
                    }
                }
            }

            parsed_columns.push(column);
        }

        // テーブル制約としての PRIMARY KEY (col)
        for constraint in constraints {
            match constraint {
                TableConstraint::Unique { columns, is_primary: true, .. } => {
                    if columns.len() != 1 {
                        return Err(ParseError::UnsupportedFeature(
                            "Composite primary keys are not supported".to_string()));
                    }
                    let pk_name = &columns[0].value;
                    let column = parsed_columns
                        .iter_mut()
                        .find(|c| &c.name == pk_name)
                        .ok_or_else(|| ParseError::InvalidTable(format!("Primary key column {} not defined", pk_name)))?;
                    if !column.is_primary_key() {
                        *column = column.clone().primary_key();
                    }
                },
                _ => return Err(ParseError::UnsupportedFeature("Unsupported table constraint".to_string())),
            }
        }

        let mut schema = TableSchema::new(table_name);
        for column in parsed_columns {
            schema.add_column(column).map_err(|e| ParseError::InvalidTable(e.to_string()))?;
        }
        schema.validate().map_err(|e| ParseError::InvalidTable(e.to_string()))?;

        Ok(ParsedStatement::CreateTable(CreateTableStatement {
            schema,
            if_not_exists,
        }))
    }

    /// SELECT文を解析する
    fn parse_select(&self, query: Query) -> Result<SelectStatement, ParseError> {
        if !query.order_by.is_empty() {
            return Err(ParseError::UnsupportedFeature("ORDER BY is not supported".to_string()));
        }

        // LIMIT句の解析
        let limit = match query.limit {
            Some(Expr::Value(SqlValue::Number(n, _))) => Some(
                n.parse::<usize>()
                    .map_err(|_| ParseError::InvalidValue(format!("Invalid LIMIT: {}", n)))?,
            ),
            Some(other) => return Err(ParseError::UnsupportedFeature(format!("Unsupported LIMIT: {}", other))),
            None => None,
        };

        let select = match *query.body {
            SetExpr::Select(select) => select,
            _ => return Err(ParseError::UnsupportedFeature("Only simple SELECT queries are supported".to_string())),
        };

        if select.from.len() != 1 {
            return Err(ParseError::UnsupportedFeature("Exactly one FROM source is supported".to_string()));
        }
        let source = &select.from[0];
        let from = self.get_table_ref(&source.relation)?;
        let join = self.parse_join(source)?;

        // カラムリストの解析
        let projection = if select.projection.iter().any(|item| matches!(item, SelectItem::Wildcard(_))) {
            Projection::Wildcard // '*' を使用した場合は全カラムを意味する
        } else {
            let mut items = Vec::new();
            for item in &select.projection {
                let (expr, alias) = match item {
                    SelectItem::UnnamedExpr(expr) => (expr, None),
                    SelectItem::ExprWithAlias { expr, alias } => (expr, Some(alias.value.clone())),
                    _ => return Err(ParseError::UnsupportedFeature("Complex SELECT expressions not supported".to_string())),
                };
                let column = self.column_ref(expr)?.ok_or_else(|| {
                    ParseError::UnsupportedFeature("Only column references can be selected".to_string())
                })?;
                items.push(SelectItemRef { column, alias });
            }
            Projection::Items(items)
        };

        // WHERE句の解析
        let filter = match &select.selection {
            Some(expr) => Some(self.parse_filter_expression(expr)?),
            None => None,
        };

        Ok(SelectStatement {
            projection,
            from,
            join,
            filter,
            limit,
        })
    }

    fn parse_join(&self, source: &TableWithJoins) -> Result<Option<JoinClause>, ParseError> {
        match source.joins.as_slice() {
            [] => Ok(None),
            [join] => match &join.join_operator {
                JoinOperator::Inner(JoinConstraint::On(expr)) => Ok(Some(JoinClause {
                    table: self.get_table_ref(&join.relation)?,
                    on: self.parse_filter_expression(expr)?,
                })),
                _ => Err(ParseError::UnsupportedFeature("Only INNER JOIN ... ON is supported".to_string())),
            },
            _ => Err(ParseError::UnsupportedFeature("At most one JOIN is supported".to_string())),
        }
    }

    /// INSERT文を解析する
    fn parse_insert(
        &self,
        table_name: ObjectName,
        columns: Vec<Ident>,
        values: Vec<Vec<Expr>>,
    ) -> Result<ParsedStatement, ParseError> {
        let table = self.object_name_to_string(&table_name)?;
        let column_names: Vec<String> = columns.into_iter().map(|ident| ident.value).collect();
        if column_names.is_empty() {
            return Err(ParseError::UnsupportedFeature("INSERT requires an explicit column list".to_string()));
        }

        let mut rows = Vec::new();
        for row in values {
            if row.len() != column_names.len() {
                return Err(ParseError::InvalidValue(format!(
                    "Expected {} values, got {}", column_names.len(), row.len())));
            }
            let mut operands = Vec::new();
            for expr in &row {
                match self.operand(expr)? {
                    Operand::Column(c) => {
                        return Err(ParseError::InvalidValue(format!("Column reference {} in VALUES", c.name)));
                    }
                    operand => operands.push(operand),
                }
            }
            rows.push(operands);
        }

        Ok(ParsedStatement::Insert(InsertStatement {
            table_name: table,
            columns: column_names,
            rows,
            upsert: false,
        }))
    }

    /// ObjectNameを文字列に変換する
    fn object_name_to_string(&self, name: &ObjectName) -> Result<String, ParseError> {
        if name.0.len() != 1 {
            return Err(ParseError::UnsupportedFeature("Schema qualified names not supported".to_string()));
        }
        Ok(name.0[0].value.clone())
    }

    /// テーブル参照を取得する
    fn get_table_ref(&self, relation: &TableFactor) -> Result<TableRef, ParseError> {
        if let TableFactor::Table { name, alias, .. } = relation {
            Ok(TableRef {
                name: self.object_name_to_string(name)?,
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            })
        } else {
            Err(ParseError::UnsupportedFeature("Complex table sources not supported".to_string()))
        }
    }

    fn column_ref(&self, expr: &Expr) -> Result<Option<ColumnRef>, ParseError> {
        match expr {
            Expr::Identifier(ident) => Ok(Some(ColumnRef { qualifier: None, name: ident.value.clone() })),
            Expr::CompoundIdentifier(parts) => match parts.as_slice() {
                [qualifier, name] => Ok(Some(ColumnRef {
                    qualifier: Some(qualifier.value.clone()),
                    name: name.value.clone(),
                })),
                _ => Err(ParseError::UnsupportedFeature(format!("Unsupported column reference: {}", expr))),
            },
            Expr::Nested(inner) => self.column_ref(inner),
            _ => Ok(None),
        }
    }

    /// 式を項に変換する（カラム参照、リテラル、NOW()、CAST）
    fn operand(&self, expr: &Expr) -> Result<Operand, ParseError> {
        if let Some(column) = self.column_ref(expr)? {
            return Ok(Operand::Column(column));
        }
        match expr {
            Expr::Value(value) => self.sql_value_to_value(value).map(Operand::Literal),
            Expr::Nested(inner) => self.operand(inner),
            Expr::UnaryOp { op: UnaryOperator::Minus, expr } => match expr.as_ref() {
                Expr::Value(SqlValue::Number(n, _)) => format!("-{}", n)
                    .parse::<i64>()
                    .map(|i| Operand::Literal(TypedValue::Int(i)))
                    .map_err(|_| ParseError::InvalidValue(format!("Invalid integer value: -{}", n))),
                _ => Err(ParseError::UnsupportedFeature("Unary minus on non-literal".to_string())),
            },
            Expr::Function(function) if function.name.to_string().eq_ignore_ascii_case("NOW") => Ok(Operand::Now),
            Expr::Cast { expr, data_type, .. } => {
                let target = DataType::from_sql_name(&data_type.to_string());
                match self.operand(expr)? {
                    Operand::Literal(value) => value
                        .cast_to(&target)
                        .map(Operand::Literal)
                        .map_err(|e| ParseError::InvalidValue(e.to_string())),
                    _ => Err(ParseError::UnsupportedFeature("CAST of non-literal".to_string())),
                }
            },
            _ => Err(ParseError::UnsupportedFeature(format!("Unsupported expression: {}", expr))),
        }
    }

    /// SQL値をドメイン値に変換する
    fn sql_value_to_value(&self, value: &SqlValue) -> Result<TypedValue, ParseError> {
        match value {
            SqlValue::Number(n, _) => n
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|_| ParseError::InvalidValue(format!("Invalid integer value: {}", n))),
            SqlValue::SingleQuotedString(s) => Ok(TypedValue::Str(s.clone())),
            SqlValue::HexStringLiteral(h) => hex::decode(h)
                .map(|raw| TypedValue::Bytes(Bytes::from(raw)))
                .map_err(|_| ParseError::InvalidValue(format!("Invalid hex literal: {}", h))),
            SqlValue::Boolean(b) => Ok(TypedValue::Bool(*b)),
            SqlValue::Null => Ok(TypedValue::Null),
            _ => Err(ParseError::InvalidValue(format!("Unsupported value type: {:?}", value)))
        }
    }

    /// WHERE句の式をフィルター条件に変換する
    fn parse_filter_expression(&self, expr: &Expr) -> Result<FilterCondition, ParseError> {
        match expr {
            // AND条件
            Expr::BinaryOp { left, op: BinaryOperator::And, right } => {
                let left_condition = self.parse_filter_expression(left)?;
                let right_condition = self.parse_filter_expression(right)?;

                // 既にAND条件ならマージする
                let mut conditions = Vec::new();
                for condition in [left_condition, right_condition] {
                    match condition {
                        FilterCondition::And(inner) => conditions.extend(inner),
                        other => conditions.push(other),
                    }
                }
                Ok(FilterCondition::And(conditions))
            },

            // OR条件
            Expr::BinaryOp { left, op: BinaryOperator::Or, right } => {
                let left_condition = self.parse_filter_expression(left)?;
                let right_condition = self.parse_filter_expression(right)?;

                // 既にOR条件ならマージする
                let mut conditions = Vec::new();
                for condition in [left_condition, right_condition] {
                    match condition {
                        FilterCondition::Or(inner) => conditions.extend(inner),
                        other => conditions.push(other),
                    }
                }
                Ok(FilterCondition::Or(conditions))
            },

            // 比較演算
            Expr::BinaryOp { left, op, right } => {
                let operator = match op {
                    BinaryOperator::Eq => FilterOperator::Equal,
                    BinaryOperator::NotEq => FilterOperator::NotEqual,
                    BinaryOperator::Gt => FilterOperator::Greater,
                    BinaryOperator::GtEq => FilterOperator::GreaterOrEqual,
                    BinaryOperator::Lt => FilterOperator::Less,
                    BinaryOperator::LtEq => FilterOperator::LessOrEqual,
                    _ => return Err(ParseError::UnsupportedFeature(
                        format!("Unsupported operator: {:?}", op)))
                };
                Ok(FilterCondition::Compare {
                    left: self.operand(left)?,
                    operator,
                    right: self.operand(right)?,
                })
            },

            Expr::UnaryOp { op: UnaryOperator::Not, expr } => {
                Ok(FilterCondition::Not(Box::new(self.parse_filter_expression(expr)?)))
            },
            Expr::IsNull(inner) => Ok(FilterCondition::IsNull { operand: self.operand(inner)?, negated: false }),
            Expr::IsNotNull(inner) => Ok(FilterCondition::IsNull { operand: self.operand(inner)?, negated: true }),
            Expr::Nested(inner) => self.parse_filter_expression(inner),

            // その他の式はサポートしない
            _ => Err(ParseError::UnsupportedFeature("Unsupported WHERE expression".to_string()))
        }
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// トークン列をセミコロンで文ごとに分割する（空の文は捨てる）
fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        match token {
            Token::SemiColon => chunks.push(std::mem::take(&mut current)),
            Token::EOF => {}
            other => current.push(other),
        }
    }
    chunks.push(current);
    chunks
        .into_iter()
        .filter(|chunk| chunk.iter().any(|t| !matches!(t, Token::Whitespace(_))))
        .collect()
}

/// 先頭から `n` 個の単語を大文字で返す
fn leading_words(tokens: &[Token], n: usize) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .take(n)
        .map(|t| match t {
            Token::Word(word) => word.value.to_uppercase(),
            other => other.to_string(),
        })
        .collect()
}

/// `CREATE INDEX [IF NOT EXISTS] ON table(col, ...)` を解析する
///
/// インデックス名を取らない形式なので汎用パーサーではなくトークンを直接読む。
fn parse_create_index(tokens: &[Token]) -> Result<ParsedStatement, ParseError> {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !matches!(t, Token::Whitespace(_))).collect();
    let mut cursor = significant.into_iter().skip(2).peekable();
    let syntax = |msg: &str| ParseError::SyntaxError(format!("CREATE INDEX: {}", msg));

    let mut if_not_exists = false;
    if matches!(cursor.peek(), Some(Token::Word(Word { keyword: Keyword::IF, .. }))) {
        cursor.next();
        for expected in [Keyword::NOT, Keyword::EXISTS] {
            match cursor.next() {
                Some(Token::Word(w)) if w.keyword == expected => {}
                _ => return Err(syntax("expected IF NOT EXISTS")),
            }
        }
        if_not_exists = true;
    }

    match cursor.next() {
        Some(Token::Word(w)) if w.keyword == Keyword::ON => {}
        _ => return Err(syntax("expected ON")),
    }
    let table_name = match cursor.next() {
        Some(Token::Word(w)) => w.value.clone(),
        _ => return Err(syntax("expected table name")),
    };
    if !matches!(cursor.next(), Some(Token::LParen)) {
        return Err(syntax("expected '('"));
    }

    let mut columns = Vec::new();
    loop {
        match cursor.next() {
            Some(Token::Word(w)) => columns.push(w.value.clone()),
            _ => return Err(syntax("expected column name")),
        }
        match cursor.next() {
            Some(Token::Comma) => continue,
            Some(Token::RParen) => break,
            _ => return Err(syntax("expected ',' or ')'")),
        }
    }
    if cursor.next().is_some() {
        return Err(syntax("unexpected trailing tokens"));
    }

    Ok(ParsedStatement::CreateIndex(CreateIndexStatement {
        table_name,
        columns,
        if_not_exists,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parser() -> SqlParser {
        SqlParser::new()
    }

    #[test]
    fn parses_transactional_ddl_group() {
        let script = "BEGIN TRANSACTION;\n\
            CREATE TABLE IF NOT EXISTS Clients (id INTEGER, name VARCHAR, deactive BOOLEAN, PRIMARY KEY (id));\n\
            CREATE INDEX IF NOT EXISTS ON Clients(name);\n\
            COMMIT;";
        let statements = parser().parse_script(script).unwrap();
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[0], ParsedStatement::Begin);
        match &statements[1] {
            ParsedStatement::CreateTable(create) => {
                assert!(create.if_not_exists);
                assert_eq!(create.schema.name, "Clients");
                assert_eq!(create.schema.column_names(), vec!["id", "name", "deactive"]);
                assert_eq!(create.schema.get_primary_key().map(|c| c.name.as_str()), Some("id"));
                assert_eq!(create.schema.columns[2].data_type, DataType::Boolean);
            }
            other => panic!("unexpected statement {:?}", other),
        }
        assert_eq!(
            statements[2],
            ParsedStatement::CreateIndex(CreateIndexStatement {
                table_name: "Clients".into(),
                columns: vec!["name".into()],
                if_not_exists: true,
            })
        );
        assert_eq!(statements[3], ParsedStatement::Commit);
    }

    #[test]
    fn parses_upsert_with_typed_literals() {
        let statements = parser()
            .parse_script("UPSERT INTO Clients (id, name, deactive) VALUES (-3, 'O''Brien', NULL)")
            .unwrap();
        match &statements[0] {
            ParsedStatement::Insert(insert) => {
                assert!(insert.upsert);
                assert_eq!(insert.table_name, "Clients");
                assert_eq!(
                    insert.rows[0],
                    vec![
                        Operand::Literal(TypedValue::Int(-3)),
                        Operand::Literal(TypedValue::from("O'Brien")),
                        Operand::Literal(TypedValue::Null),
                    ]
                );
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn parses_now_cast_and_hex_literals() {
        let statements = parser()
            .parse_script("INSERT INTO T (a, b, c) VALUES (NOW(), CAST('1970-01-01T00:00:00Z' AS TIMESTAMP), x'0aff')")
            .unwrap();
        match &statements[0] {
            ParsedStatement::Insert(insert) => {
                assert!(!insert.upsert);
                assert_eq!(insert.rows[0][0], Operand::Now);
                assert_eq!(insert.rows[0][1], Operand::Literal(TypedValue::Timestamp(Utc.timestamp_opt(0, 0).unwrap())));
                assert_eq!(insert.rows[0][2], Operand::Literal(TypedValue::Bytes(Bytes::from_static(&[0x0a, 0xff]))));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn parses_filter_with_null_comparison() {
        let select = parser()
            .parse_query("SELECT id, name, deactive FROM Clients WHERE deactive != NULL OR name < 'client20'")
            .unwrap();
        assert_eq!(select.from, TableRef { name: "Clients".into(), alias: None });
        assert_eq!(
            select.filter,
            Some(FilterCondition::Or(vec![
                FilterCondition::Compare {
                    left: Operand::Column(ColumnRef { qualifier: None, name: "deactive".into() }),
                    operator: FilterOperator::NotEqual,
                    right: Operand::Literal(TypedValue::Null),
                },
                FilterCondition::Compare {
                    left: Operand::Column(ColumnRef { qualifier: None, name: "name".into() }),
                    operator: FilterOperator::Less,
                    right: Operand::Literal(TypedValue::from("client20")),
                },
            ]))
        );
    }

    #[test]
    fn parses_aliased_inner_join() {
        let select = parser()
            .parse_query("SELECT id, ts, c.name AS client_name FROM Orders INNER JOIN Clients AS c ON client_id = c.id WHERE id < 100")
            .unwrap();
        let join = select.join.expect("join clause");
        assert_eq!(join.table, TableRef { name: "Clients".into(), alias: Some("c".into()) });
        match select.projection {
            Projection::Items(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[2].column.qualifier.as_deref(), Some("c"));
                assert_eq!(items[2].alias.as_deref(), Some("client_name"));
            }
            Projection::Wildcard => panic!("expected explicit projection"),
        }
    }

    #[test]
    fn reports_position_of_bad_statement() {
        let err = parser()
            .parse_script("BEGIN; CREATE TABLE A (id INTEGER, PRIMARY KEY (id)); CREATE INDEX ON A; COMMIT;")
            .unwrap_err();
        assert_eq!(err.statement, 1);
    }

    #[test]
    fn rejects_tables_without_primary_key() {
        let err = parser().parse_script("CREATE TABLE A (id INTEGER)").unwrap_err();
        assert!(matches!(err.error, ParseError::InvalidTable(_)));
    }

    #[test]
    fn query_must_be_single_select() {
        assert!(parser().parse_query("SELECT id FROM A; SELECT id FROM B").is_err());
        assert!(parser().parse_query("UPSERT INTO A (id) VALUES (1)").is_err());
        assert!(parser().parse_query("   ").is_err());
    }
}
