//! コマンドライン引数

use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::application::ProvisionMode;
use crate::client::{ClientConfig, DEFAULT_ADDR, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MS};
use crate::infrastructure::repository::{DEFAULT_PASSWORD, DEFAULT_USER};
use crate::interface::api::DEFAULT_PORT;

/// 改ざん検知型SQLストアのスキーマ作成・取り込み・クエリを行うクライアント
#[derive(Parser, Debug)]
#[command(name = "ledgersql", version, about)]
pub struct Cli {
    /// ゲートウェイのURL
    #[arg(long, default_value = DEFAULT_ADDR, env = "LEDGERSQL_ADDR")]
    pub addr: String,

    /// ユーザー名
    #[arg(long, default_value = DEFAULT_USER, env = "LEDGERSQL_USER")]
    pub user: String,

    /// パスワード
    #[arg(long, default_value = DEFAULT_PASSWORD, env = "LEDGERSQL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// リモート呼び出し1回あたりの期限（ミリ秒）
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, env = "LEDGERSQL_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// 1スクリプトで送るUPSERTの行数
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "LEDGERSQL_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// IF NOT EXISTS を付けずに DDL を発行する
    #[arg(long, env = "LEDGERSQL_STRICT")]
    pub strict: bool,

    /// 未対応の型の値をプレースホルダーで表示せずにエラーにする
    #[arg(long, env = "LEDGERSQL_STRICT_RENDER")]
    pub strict_render: bool,

    /// ネットワークを使わずプロセス内のストアに対して実行する
    #[arg(long, env = "LEDGERSQL_EMBEDDED")]
    pub embedded: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// スキーマ作成、固定ワークロードの取り込み、デモクエリ2本の表示
    Demo,
    /// 4テーブルのスキーマだけを作成する
    Provision,
    /// 固定ワークロードの行だけを取り込む
    Ingest,
    /// 任意のクエリを実行して結果表を表示する
    Query {
        /// 実行するSQL（そのまま送信する）
        sql: String,
    },
    /// インメモリストアを背後に持つローカルゲートウェイを起動する
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT, env = "LEDGERSQL_PORT")]
        port: u16,
    },
}

impl Cli {
    /// 接続設定を組み立てる
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .addr(self.addr.clone())
            .user(self.user.clone())
            .password(self.password.clone())
            .request_timeout(Duration::from_millis(self.timeout_ms))
            .chunk_size(self.chunk_size)
            .provision_mode(if self.strict { ProvisionMode::Strict } else { ProvisionMode::IfNotExists })
            .build()
    }
}
