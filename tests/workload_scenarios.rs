use std::sync::Arc;

use ledgersql::application::workload::{self, CLIENTS_QUERY, ORDERS_QUERY};
use ledgersql::application::{BatchIngestor, Pipeline, ProvisionMode, UpsertRow};
use ledgersql::client::ClientConfig;
use ledgersql::domain::entity::TypedValue;
use ledgersql::domain::repository::SqlStore;
use ledgersql::infrastructure::repository::MemoryStore;
use ledgersql::interface::console::render_table;
use ledgersql::Error;

async fn pipeline_with(store: Arc<MemoryStore>, config: ClientConfig) -> Pipeline {
    let pipeline = Pipeline::new(store, config).unwrap();
    pipeline.login().await.unwrap();
    pipeline
}

async fn loaded() -> (Arc<MemoryStore>, Pipeline) {
    let store = Arc::new(MemoryStore::default());
    let pipeline = pipeline_with(store.clone(), ClientConfig::default()).await;
    pipeline.provision_workload().await.unwrap();
    assert_eq!(pipeline.ingest_workload().await.unwrap(), 1400);
    (store, pipeline)
}

#[tokio::test]
async fn clients_query_uses_lexicographic_names_and_null_semantics() {
    let (_, pipeline) = loaded().await;
    let result = pipeline.query(CLIENTS_QUERY).await.unwrap();

    assert_eq!(result.column_names(), vec!["id", "name", "deactive"]);
    let ids: Vec<&TypedValue> = result.column_values(0).collect();
    let expected: Vec<TypedValue> = [0, 1, 2].into_iter().chain(10..=19).map(TypedValue::Int).collect();
    assert_eq!(ids, expected.iter().collect::<Vec<_>>());
    assert!(result.column_values(2).all(|v| v.render() == "NULL"));

    let text = render_table(&result).unwrap();
    assert!(text.contains("client19"));
    assert!(!text.contains("client20"));
}

#[tokio::test]
async fn orders_join_returns_one_row_per_order_with_client_name() {
    let (_, pipeline) = loaded().await;
    let result = pipeline.query(ORDERS_QUERY).await.unwrap();

    assert_eq!(result.column_names(), vec!["id", "ts", "client_name"]);
    assert_eq!(result.len(), 100);
    for row in result.rows() {
        let id = match row.values[0] {
            TypedValue::Int(id) => id,
            ref other => panic!("unexpected id {other:?}"),
        };
        assert!(matches!(row.values[1], TypedValue::Timestamp(_)));
        assert_eq!(row.values[2], TypedValue::Str(format!("client{}", id)));
    }
}

#[tokio::test]
async fn reprovisioning_depends_on_mode() {
    let (store, _) = loaded().await;

    let lenient = pipeline_with(store.clone(), ClientConfig::default()).await;
    lenient.provision_workload().await.unwrap();

    let strict = pipeline_with(store.clone(), ClientConfig::builder().provision_mode(ProvisionMode::Strict).build()).await;
    match strict.provision_workload().await.unwrap_err() {
        Error::Schema { group, statement, sql, .. } => {
            assert_eq!(group, "clients");
            assert_eq!(statement, Some(0));
            assert!(sql.unwrap().starts_with("CREATE TABLE Clients"));
        }
        other => panic!("unexpected error {other}"),
    }

    // 再作成でデータは失われない
    assert_eq!(store.storage().row_count("Clients").unwrap(), 100);
}

#[tokio::test]
async fn failed_group_leaves_no_tables_behind() {
    let store = Arc::new(MemoryStore::default());
    let strict = pipeline_with(store.clone(), ClientConfig::builder().provision_mode(ProvisionMode::Strict).build()).await;
    // 同名のテーブルが既にあると Strict ではグループの3文目で失敗する
    store
        .exec("CREATE TABLE OrderItems (id INTEGER, PRIMARY KEY (id))")
        .await
        .unwrap();

    let group = workload::ddl_groups().unwrap().remove(2);
    let err = strict.provisioner().provision(&group).await.unwrap_err();
    assert!(matches!(err, Error::Schema { statement: Some(2), .. }));
    assert!(!store.storage().table_exists("Orders").unwrap());
}

#[tokio::test]
async fn ingestion_stops_at_failing_row_and_resumes() {
    let store = Arc::new(MemoryStore::default());
    let pipeline = pipeline_with(store.clone(), ClientConfig::default()).await;
    pipeline.provision_workload().await.unwrap();
    let clients = workload::clients().unwrap();

    let mut rows = workload::client_rows();
    rows.truncate(10);
    let good = rows[4].clone();
    // 型の合わない値で5行目を失敗させる
    rows[4] = UpsertRow::new().set("id", 4i64).set("name", 4i64);

    let ingestor = BatchIngestor::new(store.clone(), 1, std::time::Duration::from_secs(1));
    let err = ingestor.ingest(&clients, &rows).await.unwrap_err();
    match &err {
        Error::Ingest { committed, failed_row, key, .. } => {
            assert_eq!((*committed, *failed_row), (4, 4));
            assert_eq!(key, "4");
        }
        other => panic!("unexpected error {other}"),
    }

    // 失敗した行より前は取り込まれ、後ろは送られていない
    let result = pipeline.query("SELECT id FROM Clients").await.unwrap();
    assert_eq!(result.len(), 4);

    rows[4] = good;
    let resumed = ingestor.resume(&clients, &rows, err.resume_from().unwrap()).await.unwrap();
    assert_eq!(resumed, 10);
    assert_eq!(pipeline.query("SELECT id FROM Clients").await.unwrap().len(), 10);
}

#[tokio::test]
async fn chunked_ingestion_attributes_failures_to_rows() {
    let store = Arc::new(MemoryStore::default());
    let config = ClientConfig::builder().chunk_size(4).build();
    let pipeline = pipeline_with(store.clone(), config).await;
    pipeline.provision_workload().await.unwrap();

    let mut rows = workload::client_rows();
    rows.truncate(12);
    rows[6] = UpsertRow::new().set("id", TypedValue::Null).set("name", "nobody");

    let err = pipeline.ingestor().ingest(&workload::clients().unwrap(), &rows).await.unwrap_err();
    assert!(matches!(err, Error::Ingest { committed: 6, failed_row: 6, .. }));
    assert_eq!(store.storage().row_count("Clients").unwrap(), 6);
}

#[tokio::test]
async fn remote_query_errors_surface_verbatim() {
    let (_, pipeline) = loaded().await;
    let err = pipeline.query("SELECT id FROM Missing").await.unwrap_err();
    assert!(matches!(&err, Error::Query(msg) if msg.contains("Missing")));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn unwritable_values_stop_ingestion_before_anything_is_sent() {
    let store = Arc::new(MemoryStore::default());
    let pipeline = pipeline_with(store.clone(), ClientConfig::builder().chunk_size(4).build()).await;
    pipeline.provision_workload().await.unwrap();

    let mut rows = workload::client_rows();
    rows.truncate(4);
    rows[2] = UpsertRow::new().set("id", 2i64).set("name", TypedValue::Unsupported("f".into()));

    let err = pipeline.ingestor().ingest(&workload::clients().unwrap(), &rows).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(err.resume_from(), None);
    assert_eq!(store.storage().row_count("Clients").unwrap(), 0);
}
