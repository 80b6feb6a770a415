pub mod sql_parser;

pub use sql_parser::{
    SqlParser, ParseError, ScriptParseError, ParsedStatement,
    CreateTableStatement, CreateIndexStatement, InsertStatement, SelectStatement,
    FilterCondition, FilterOperator, Operand, ColumnRef, TableRef, JoinClause,
    Projection, SelectItemRef,
};
