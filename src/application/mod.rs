pub mod ingestor;
pub mod pipeline;
pub mod plan;
pub mod provisioner;
pub mod query_runner;
pub mod workload;

pub use ingestor::{sql_literal, BatchIngestor, UpsertRow, UpsertValue};
pub use pipeline::Pipeline;
pub use plan::IngestPlan;
pub use provisioner::{DdlGroup, ProvisionMode, SchemaProvisioner};
pub use query_runner::{decode_result, QueryRunner};
