//! 外部の将棋エンジンを USI / XBoard (CECP) で動かすクライアント
//!
//! - [`channel`]: 子プロセスとの行単位の入出力
//! - [`xboard`] / [`usi`]: 方言ごとのプロトコルクライアント
//! - [`wrapper`]: 方言を問わない探索手順
//! - [`supervisor`]: 設定からの組み立てと起動の再試行

pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod info;
pub mod protocol;
pub mod registry;
pub mod supervisor;
pub mod types;
pub mod usi;
pub mod wrapper;
pub mod xboard;

#[cfg(test)]
mod testing;

pub use channel::{ChildProcessChannel, EngineCommand, LineChannel};
pub use config::{Config, EngineConfig, ProtocolKind};
pub use error::{EngineError, Result};
pub use info::{InfoTag, Score, ScoreKind, SearchInfo};
pub use protocol::{EngineProtocol, OptionValue, ProtocolOptions};
pub use registry::EngineRegistry;
pub use supervisor::{create_engine, create_engine_with_backoff, BackoffPolicy};
pub use types::{BestMoveResult, Color, SearchLimits, SearchRequest, TimeControl, Variant};
pub use usi::UsiClient;
pub use wrapper::{Clocks, EngineWrapper, GameState, GoCommands};
pub use xboard::{Capabilities, XBoardClient};
