use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ledgersql::application::workload;
use ledgersql::application::Pipeline;
use ledgersql::client::HttpStore;
use ledgersql::domain::repository::SqlStore;
use ledgersql::infrastructure::repository::MemoryStore;
use ledgersql::interface::api::{start_server, ServerConfig};
use ledgersql::interface::cli::{Cli, Command};
use ledgersql::interface::console::render_query;
use ledgersql::{Error, Result, VERSION};

#[tokio::main]
async fn main() -> ExitCode {
    // ログは標準エラーへ（標準出力は結果表だけにする）
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("ledgersql version: {}", VERSION);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, code = e.exit_code(), "aborting");
            eprintln!("error: {}", e);
            if let Some(row) = e.resume_from() {
                eprintln!("ingestion can be resumed from row {}", row);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Serve { port } = cli.command {
        let config = ServerConfig {
            port,
            user: cli.user.clone(),
            password: cli.password.clone(),
        };
        return start_server(config).await;
    }

    let config = cli.client_config();
    config.validate()?;

    let store: Arc<dyn SqlStore> = if cli.embedded {
        info!("using the in-process store");
        Arc::new(MemoryStore::with_credentials(Default::default(), config.user.clone(), config.password.clone()))
    } else {
        Arc::new(HttpStore::new(config.addr.clone(), config.request_timeout)?)
    };

    let pipeline = Pipeline::new(store, config)?;
    pipeline.login().await?;

    let outcome = match &cli.command {
        Command::Demo => demo(&pipeline, cli.strict_render).await,
        Command::Provision => pipeline.provision_workload().await,
        Command::Ingest => pipeline.ingest_workload().await.map(|_| ()),
        Command::Query { sql } => print_query(&pipeline, sql, cli.strict_render).await,
        Command::Serve { .. } => Err(Error::Config("serve is handled before connecting".to_string())),
    };

    // 失敗していてもセッションは閉じる（最初のエラーを優先して返す）
    let closed = pipeline.logout().await;
    outcome.and(closed)
}

async fn demo(pipeline: &Pipeline, strict_render: bool) -> Result<()> {
    pipeline.provision_workload().await?;
    pipeline.ingest_workload().await?;
    for (index, sql) in workload::QUERIES.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print_query(pipeline, sql, strict_render).await?;
    }
    Ok(())
}

async fn print_query(pipeline: &Pipeline, sql: &str, strict_render: bool) -> Result<()> {
    let result = pipeline.query(sql).await?;
    print!("{}", render_query(sql, &result, strict_render)?);
    Ok(())
}
