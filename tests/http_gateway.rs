use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ledgersql::application::workload::{CLIENTS_QUERY, ORDERS_QUERY};
use ledgersql::application::Pipeline;
use ledgersql::client::{ClientConfig, HttpStore};
use ledgersql::domain::repository::{SqlStore, StoreError};
use ledgersql::infrastructure::repository::MemoryStore;
use ledgersql::interface::api::spawn_gateway;
use ledgersql::interface::console::render_query;
use ledgersql::Error;

async fn gateway() -> String {
    let store = Arc::new(MemoryStore::default());
    let addr = spawn_gateway(store, SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
    format!("http://{}", addr)
}

fn http_store(base_url: &str) -> HttpStore {
    HttpStore::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn demo_runs_end_to_end_over_http() {
    let base_url = gateway().await;
    let config = ClientConfig::builder().addr(base_url.clone()).chunk_size(50).build();
    let pipeline = Pipeline::new(Arc::new(http_store(&base_url)), config).unwrap();

    pipeline.login().await.unwrap();
    pipeline.provision_workload().await.unwrap();
    assert_eq!(pipeline.ingest_workload().await.unwrap(), 1400);

    let clients = pipeline.query(CLIENTS_QUERY).await.unwrap();
    assert_eq!(clients.len(), 13);
    let printed = render_query(CLIENTS_QUERY, &clients, true).unwrap();
    assert!(printed.starts_with(&format!("QUERY: '{}'", CLIENTS_QUERY)));
    assert!(printed.contains("NULL"));

    let orders = pipeline.query(ORDERS_QUERY).await.unwrap();
    assert_eq!(orders.len(), 100);

    pipeline.logout().await.unwrap();
}

#[tokio::test]
async fn wrong_credentials_are_a_transport_error() {
    let base_url = gateway().await;
    let store = http_store(&base_url);
    let err = store.login("immudb", "nope").await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized(_)));

    let config = ClientConfig::builder().addr(base_url.clone()).password("nope").build();
    let pipeline = Pipeline::new(Arc::new(http_store(&base_url)), config).unwrap();
    let err = pipeline.login().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn statement_position_crosses_the_wire() {
    let base_url = gateway().await;
    let store = http_store(&base_url);
    store.login("immudb", "immudb").await.unwrap();

    let err = store
        .exec("BEGIN TRANSACTION; CREATE TABLE t (id INTEGER, PRIMARY KEY (id)); CREATE INDEX ON t(missing); COMMIT;")
        .await
        .unwrap_err();
    assert_eq!(err.statement(), Some(1));

    let err = store.query("SELECT id FROM t").await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected { statement: None, .. }));
}

#[tokio::test]
async fn logged_out_token_is_rejected() {
    let base_url = gateway().await;
    let first = http_store(&base_url);
    let second = http_store(&base_url);
    first.login("immudb", "immudb").await.unwrap();
    second.login("immudb", "immudb").await.unwrap();

    first.logout().await.unwrap();
    assert!(matches!(first.exec("CREATE TABLE t (id INTEGER, PRIMARY KEY (id))").await, Err(StoreError::Unauthorized(_))));

    // 他のセッションには影響しない
    second.exec("CREATE TABLE t (id INTEGER, PRIMARY KEY (id))").await.unwrap();
}

#[tokio::test]
async fn health_route_answers() {
    let base_url = gateway().await;
    let status = reqwest::get(format!("{}/health", base_url)).await.unwrap().status();
    assert!(status.is_success());
}
