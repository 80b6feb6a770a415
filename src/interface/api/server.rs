use axum::{
    Router,
    routing::{get, post},
    Extension,
    Server,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::http::{EXEC_PATH, LOGIN_PATH, LOGOUT_PATH, QUERY_PATH};
use crate::domain::repository::SqlStore;
use crate::infrastructure::repository::{MemoryStore, DEFAULT_PASSWORD, DEFAULT_USER};
use crate::interface::api::handler::{
    exec_handler,
    health_check_handler,
    login_handler,
    logout_handler,
    query_handler,
    GatewayState,
};
use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 3323;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT, // デフォルトポート番号
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// ゲートウェイのルーターを組み立てる
pub fn router(store: Arc<dyn SqlStore>) -> Router {
    let state = Arc::new(GatewayState::new(store));

    Router::new()
        .route("/health", get(health_check_handler))
        .route(LOGIN_PATH, post(login_handler))
        .route(EXEC_PATH, post(exec_handler))
        .route(QUERY_PATH, post(query_handler))
        .route(LOGOUT_PATH, post(logout_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(state)),
        )
}

/// 指定したアドレスでゲートウェイを起動し、実際に待ち受けているアドレスを返す
///
/// ポート0を指定すると空いているポートが割り当てられる。サーバーはバックグラウンドで動き続ける。
pub async fn spawn_gateway(store: Arc<dyn SqlStore>, addr: SocketAddr) -> Result<SocketAddr> {
    let server = Server::try_bind(&addr)
        .map_err(|e| Error::Transport(format!("failed to bind {}: {}", addr, e)))?
        .serve(router(store).into_make_service());
    let local_addr = server.local_addr();

    tokio::spawn(async move {
        if let Err(e) = server.await {
            tracing::error!(error = %e, "gateway stopped");
        }
    });

    Ok(local_addr)
}

/// インメモリストアを背後に持つゲートウェイを起動する（終了するまで戻らない）
pub async fn start_server(config: ServerConfig) -> Result<()> {
    // ストアの初期化
    let store: Arc<dyn SqlStore> =
        Arc::new(MemoryStore::with_credentials(Default::default(), config.user, config.password));

    // サーバーのアドレス設定
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("ゲートウェイを{}で起動中...", addr);

    // サーバーの起動
    Server::try_bind(&addr)
        .map_err(|e| Error::Transport(format!("failed to bind {}: {}", addr, e)))?
        .serve(router(store).into_make_service())
        .await
        .map_err(|e| Error::Transport(e.to_string()))
}
