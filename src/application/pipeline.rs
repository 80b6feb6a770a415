use std::sync::Arc;

use tracing::info;

use crate::application::ingestor::BatchIngestor;
use crate::application::provisioner::SchemaProvisioner;
use crate::application::query_runner::QueryRunner;
use crate::application::workload;
use crate::client::{with_deadline, ClientConfig};
use crate::domain::entity::ResultTable;
use crate::domain::repository::SqlStore;
use crate::Result;

/// ステージをまとめたセッション
///
/// 呼び出しはすべて順番に待つ。どのステージも失敗をそのまま返し、
/// 中断するかどうかは呼び出し側が決める。
pub struct Pipeline {
    store: Arc<dyn SqlStore>,
    config: ClientConfig,
    provisioner: SchemaProvisioner,
    ingestor: BatchIngestor,
    runner: QueryRunner,
}

impl Pipeline {
    pub fn new(store: Arc<dyn SqlStore>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provisioner: SchemaProvisioner::new(store.clone(), config.provision_mode, config.request_timeout),
            ingestor: BatchIngestor::new(store.clone(), config.chunk_size, config.request_timeout),
            runner: QueryRunner::new(store.clone(), config.request_timeout),
            store,
            config,
        })
    }

    pub fn provisioner(&self) -> &SchemaProvisioner {
        &self.provisioner
    }

    pub fn ingestor(&self) -> &BatchIngestor {
        &self.ingestor
    }

    pub async fn login(&self) -> Result<()> {
        with_deadline(
            self.config.request_timeout,
            "login",
            self.store.login(&self.config.user, &self.config.password),
        )
        .await?;
        info!(user = %self.config.user, "logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        with_deadline(self.config.request_timeout, "logout", self.store.logout()).await?;
        Ok(())
    }

    /// 固定ワークロードのスキーマをグループごとに作成する
    pub async fn provision_workload(&self) -> Result<()> {
        for group in workload::ddl_groups()? {
            self.provisioner.provision(&group).await?;
        }
        Ok(())
    }

    /// 固定ワークロードの行を親テーブルから順に取り込む
    pub async fn ingest_workload(&self) -> Result<usize> {
        let schemas = workload::tables()?;
        let mut total = 0;
        for name in workload::ingest_plan().ordered()? {
            let rows = workload::rows_for(&name)?;
            let schema = schemas
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| crate::Error::Config(format!("no schema for table {}", name)))?;
            total += self.ingestor.ingest(schema, &rows).await?;
        }
        info!(rows = total, "workload ingested");
        Ok(total)
    }

    pub async fn query(&self, sql: &str) -> Result<ResultTable> {
        self.runner.query(sql).await
    }
}
