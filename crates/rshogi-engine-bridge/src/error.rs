//! エンジン制御層のエラー型

use std::time::Duration;

/// プロトコルクライアントが返すエラー。
///
/// 解釈できない行 (プロトコル違反) はエラーにしない。ログに残して読み捨てる。
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// エンジンの標準出力が閉じた。セッションは続行できない。
    #[error("engine closed its output stream")]
    EndOfStream,

    /// 上限付きの待機がタイムアウトした
    #[error("timed out after {0:?} waiting for engine response")]
    Timeout(Duration),

    /// 子プロセスの起動に失敗した
    #[error("failed to spawn engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// ハンドシェイクが完了しなかった
    #[error("engine `{command}` did not complete startup: {source}")]
    Startup {
        command: String,
        #[source]
        source: Box<EngineError>,
    },

    /// 探索前の生存確認に失敗した
    #[error("unexpected engine termination")]
    UnexpectedTermination,

    /// 最終応答の指し手が座標として解釈できない
    #[error("malformed move from engine: {0}")]
    MalformedMove(String),

    /// 組み込みエンジンの名前がレジストリに無い
    #[error("unknown built-in engine: {0}")]
    UnknownBuiltin(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// 子プロセスとの通信路がもう使えないことを示すエラーかどうか。
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::EndOfStream | EngineError::Io(_))
    }
}

/// エンジン制御層の Result
pub type Result<T> = std::result::Result<T, EngineError>;
