use async_trait::async_trait;
use crate::domain::repository::wire::QueryReply;
use crate::Error;

/// リモートストアとの境界で発生するエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// ストアが文を拒否した（`statement` はスクリプト内の失敗位置、BEGIN/COMMIT は数えない）
    #[error("{message}")]
    Rejected {
        statement: Option<usize>,
        message: String,
    },
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            statement: None,
            message: message.into(),
        }
    }

    pub fn at_statement(statement: usize, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            statement: Some(statement),
            message: message.into(),
        }
    }

    /// 失敗した文の位置（分かる場合）
    pub fn statement(&self) -> Option<usize> {
        match self {
            StoreError::Rejected { statement, .. } => *statement,
            _ => None,
        }
    }

    /// 接続・認証の失敗かどうか（どのステージでも Transport として扱う）
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Unauthorized(_))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transport(msg) => Error::Transport(msg),
            StoreError::Unauthorized(msg) => Error::Transport(format!("unauthorized: {}", msg)),
            StoreError::Rejected { message, .. } => Error::Query(message),
        }
    }
}

/// SQLストア - リモートの改ざん検知型リレーショナルストアへの抽象インターフェース
///
/// すべての呼び出しは1回のリクエスト/レスポンスで、呼び出し側が完了を待ってから次を発行する。
/// 認証済みセッションは1つを全操作で共有し、セッション状態を変更するのは `login`/`logout` のみ。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlStore: Send + Sync {
    /// 認証してセッションを確立する
    async fn login(&self, user: &str, password: &str) -> Result<(), StoreError>;

    /// DDL/DML スクリプトを実行する
    ///
    /// `BEGIN TRANSACTION; ...; COMMIT;` で囲まれた部分は原子的にコミットされる。
    /// 囲まれていない文はそれぞれ個別にコミットされ、最初の失敗で実行が止まる。
    async fn exec(&self, script: &str) -> Result<(), StoreError>;

    /// クエリを実行して結果をワイヤ形式のまま返す（ページングなし）
    async fn query(&self, sql: &str) -> Result<QueryReply, StoreError>;

    /// セッションを破棄する
    async fn logout(&self) -> Result<(), StoreError>;
}
