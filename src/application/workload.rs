//! デモ用の固定ワークロード
//!
//! 4つのテーブル（Clients, Products, Orders, OrderItems）、3つのスキーマグループ、
//! 行データの生成、デモクエリ2本。

use crate::application::ingestor::{UpsertRow, UpsertValue};
use crate::application::plan::IngestPlan;
use crate::application::provisioner::DdlGroup;
use crate::domain::entity::{Column, DataType, TableError, TableSchema};
use crate::{Error, Result};

pub const CLIENTS: &str = "Clients";
pub const PRODUCTS: &str = "Products";
pub const ORDERS: &str = "Orders";
pub const ORDER_ITEMS: &str = "OrderItems";

pub const CLIENT_COUNT: i64 = 100;
pub const PRODUCT_COUNT: i64 = 100;
pub const ORDER_COUNT: i64 = 200;
pub const ORDER_ITEM_COUNT: i64 = 1000;

/// 非アクティブまたは名前が 'client20' より前のクライアント
pub const CLIENTS_QUERY: &str =
    "SELECT id, name, deactive FROM Clients WHERE deactive != NULL OR name < 'client20'";

/// 注文とクライアント名の結合
pub const ORDERS_QUERY: &str =
    "SELECT id, ts, c.name AS client_name FROM Orders INNER JOIN (Clients AS c) ON client_id = c.id WHERE id < 100";

pub const QUERIES: [&str; 2] = [CLIENTS_QUERY, ORDERS_QUERY];

fn table(name: &str, columns: Vec<Column>, indexes: &[&str]) -> std::result::Result<TableSchema, TableError> {
    let mut schema = TableSchema::new(name);
    for column in columns {
        schema.add_column(column)?;
    }
    for index in indexes {
        schema.add_index([*index])?;
    }
    schema.validate()?;
    Ok(schema)
}

fn schema_error(name: &str) -> impl FnOnce(TableError) -> Error + '_ {
    move |e| Error::Config(format!("workload table {}: {}", name, e))
}

pub fn clients() -> Result<TableSchema> {
    table(
        CLIENTS,
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("name", DataType::Varchar),
            Column::new("deactive", DataType::Boolean),
        ],
        &["name"],
    )
    .map_err(schema_error(CLIENTS))
}

pub fn products() -> Result<TableSchema> {
    table(
        PRODUCTS,
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("name", DataType::Varchar),
            Column::new("price", DataType::Integer),
            Column::new("stock", DataType::Integer),
        ],
        &["name", "stock"],
    )
    .map_err(schema_error(PRODUCTS))
}

pub fn orders() -> Result<TableSchema> {
    table(
        ORDERS,
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("ts", DataType::Timestamp),
            Column::new("client_id", DataType::Integer),
        ],
        &["ts"],
    )
    .map_err(schema_error(ORDERS))
}

pub fn order_items() -> Result<TableSchema> {
    table(
        ORDER_ITEMS,
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("order_id", DataType::Integer),
            Column::new("amount", DataType::Integer),
        ],
        &["order_id"],
    )
    .map_err(schema_error(ORDER_ITEMS))
}

/// スキーマグループ（Orders と OrderItems は同じトランザクション）
pub fn ddl_groups() -> Result<Vec<DdlGroup>> {
    Ok(vec![
        DdlGroup::new("clients", vec![clients()?]),
        DdlGroup::new("products", vec![products()?]),
        DdlGroup::new("orders", vec![orders()?, order_items()?]),
    ])
}

pub fn tables() -> Result<Vec<TableSchema>> {
    Ok(vec![clients()?, products()?, orders()?, order_items()?])
}

/// 取り込みの依存関係: Orders → Clients、OrderItems → Orders
pub fn ingest_plan() -> IngestPlan {
    IngestPlan::new()
        .with_table(CLIENTS, Vec::<String>::new())
        .with_table(PRODUCTS, Vec::<String>::new())
        .with_table(ORDERS, [CLIENTS])
        .with_table(ORDER_ITEMS, [ORDERS])
}

pub fn client_rows() -> Vec<UpsertRow> {
    (0..CLIENT_COUNT)
        .map(|i| UpsertRow::new().set("id", i).set("name", format!("client{}", i)))
        .collect()
}

pub fn product_rows() -> Vec<UpsertRow> {
    (0..PRODUCT_COUNT)
        .map(|i| {
            UpsertRow::new()
                .set("id", i)
                .set("name", format!("product{}", i))
                .set("price", i * 10)
                .set("stock", 100 - i)
        })
        .collect()
}

pub fn order_rows() -> Vec<UpsertRow> {
    (0..ORDER_COUNT)
        .map(|i| {
            UpsertRow::new()
                .set("id", i)
                .set("ts", UpsertValue::Now)
                .set("client_id", i % CLIENT_COUNT)
        })
        .collect()
}

pub fn order_item_rows() -> Vec<UpsertRow> {
    (0..ORDER_ITEM_COUNT)
        .map(|i| {
            UpsertRow::new()
                .set("id", i)
                .set("order_id", i % ORDER_COUNT)
                .set("amount", 10 + i)
        })
        .collect()
}

/// テーブル名に対応する行データ
pub fn rows_for(table: &str) -> Result<Vec<UpsertRow>> {
    match table {
        CLIENTS => Ok(client_rows()),
        PRODUCTS => Ok(product_rows()),
        ORDERS => Ok(order_rows()),
        ORDER_ITEMS => Ok(order_item_rows()),
        other => Err(Error::Config(format!("no workload rows for table {}", other))),
    }
}
