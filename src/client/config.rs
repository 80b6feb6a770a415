use std::time::Duration;
use typed_builder::TypedBuilder;

use crate::application::provisioner::ProvisionMode;
use crate::infrastructure::repository::{DEFAULT_PASSWORD, DEFAULT_USER};
use crate::{Error, Result};

pub const DEFAULT_ADDR: &str = "http://127.0.0.1:3323";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CHUNK_SIZE: usize = 1;

/// クライアントの設定
///
/// CLI 引数（環境変数のフォールバック付き）から組み立てる。
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct ClientConfig {
    /// ゲートウェイのベースURL
    #[builder(default = DEFAULT_ADDR.to_string(), setter(into))]
    pub addr: String,

    #[builder(default = DEFAULT_USER.to_string(), setter(into))]
    pub user: String,

    #[builder(default = DEFAULT_PASSWORD.to_string(), setter(into))]
    pub password: String,

    /// 1回のリモート呼び出しの期限
    #[builder(default = Duration::from_millis(DEFAULT_TIMEOUT_MS))]
    pub request_timeout: Duration,

    /// 1スクリプトで送るUPSERTの行数
    #[builder(default = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    #[builder(default)]
    pub provision_mode: ProvisionMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// 設定値の妥当性をチェックする
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(Error::Config("address must not be empty".to_string()));
        }
        if !(self.addr.starts_with("http://") || self.addr.starts_with("https://")) {
            return Err(Error::Config(format!("address '{}' must start with http:// or https://", self.addr)));
        }
        if self.user.is_empty() {
            return Err(Error::Config("user must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request timeout must be greater than zero".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".to_string()));
        }
        Ok(())
    }
}
