//! クエリ結果のコンソール表示

use comfy_table::{presets::ASCII_FULL, Cell, ContentArrangement, Table};

use crate::domain::entity::{render, ResultTable};
use crate::{Error, Result};

/// 結果表をASCIIのグリッドに整形する
///
/// 見出しはカラム名をそのままの順で、各セルは `render` の結果。
/// 行が0件でも見出しは出力する。カラムが0個の場合は `EmptyProjection`。
pub fn render_table(result: &ResultTable) -> Result<String> {
    if result.columns().is_empty() {
        return Err(Error::EmptyProjection);
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(result.columns().iter().map(|c| Cell::new(&c.name)));

    for row in result.rows() {
        table.add_row(row.iter().map(|v| Cell::new(render(v))));
    }

    Ok(table.to_string())
}

/// 厳密モードの表示（未対応の値があればエラー）
pub fn render_table_strict(result: &ResultTable) -> Result<String> {
    for row in result.rows() {
        for value in row.iter() {
            value.render_strict()?;
        }
    }
    render_table(result)
}

/// クエリ文に続けて結果表を出力する文字列
///
/// `strict` の場合は未対応の値をプレースホルダーで表示せずにエラーにする。
pub fn render_query(sql: &str, result: &ResultTable, strict: bool) -> Result<String> {
    let table = if strict { render_table_strict(result)? } else { render_table(result)? };
    Ok(format!("QUERY: '{}'\n{}\n", sql, table))
}
