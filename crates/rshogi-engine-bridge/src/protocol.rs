//! USI / XBoard の両クライアントが満たす共通インターフェース

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::channel::LineChannel;
use crate::error::{EngineError, Result};
use crate::info::SearchInfo;
use crate::types::{BestMoveResult, SearchRequest, Variant};

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_VARIANT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// エンジン制御の外部契約。
///
/// 呼び出し順は `set_variant_options` → `ping` → `go` を1回の探索単位とする
/// ([`crate::wrapper::EngineWrapper`] がこの順序を保証する)。
/// どのメソッドも呼び出し側スレッドをブロックし、同時に2つ以上を実行しない。
pub trait EngineProtocol: Send {
    /// エンジンが名乗った名前
    fn name(&self) -> Option<&str>;

    /// エンジンオプションを設定する。`None` は値なし。
    fn set_option(&mut self, name: &str, value: Option<&OptionValue>) -> Result<()>;

    /// 変則ルールと開始局面を設定する
    fn set_variant_options(&mut self, variant: Variant) -> Result<()>;

    /// 生存確認。応答が無ければ `EngineError::Timeout`。
    fn ping(&mut self) -> Result<()>;

    /// 探索して最終結果を返す。途中の `info` は [`EngineProtocol::info`] に蓄積される。
    fn go(&mut self, request: &SearchRequest<'_>) -> Result<BestMoveResult>;

    /// 直近の探索の統計。次の探索が始まるまで読める。
    fn info(&self) -> &SearchInfo;

    /// 終局時に最終局面を伝える。`sfen` は `startpos` か SFEN、`moves` はそこからの手順。
    fn report_game_result(&mut self, sfen: &str, moves: &[String]) -> Result<()>;

    /// 早期終了の要求。結果は `go` の読み取りループが受け取る。
    fn stop(&mut self) -> Result<()>;

    fn ponderhit(&mut self) -> Result<()>;

    fn quit(&mut self) -> Result<()>;

    /// プロセスを強制終了する
    fn kill(&mut self) -> Result<()>;
}

/// エンジンオプションの値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("true"),
            OptionValue::Bool(false) => f.write_str("false"),
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// クライアントの待ち時間の上限。`None` は無制限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolOptions {
    pub handshake_timeout: Option<Duration>,
    pub ping_timeout: Option<Duration>,
    pub variant_reply_timeout: Option<Duration>,
}

impl Default for ProtocolOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Some(DEFAULT_HANDSHAKE_TIMEOUT),
            ping_timeout: Some(DEFAULT_PING_TIMEOUT),
            variant_reply_timeout: Some(DEFAULT_VARIANT_REPLY_TIMEOUT),
        }
    }
}

/// 行を先頭トークンと残りに分ける
pub(crate) fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim_start()),
        None => (line, ""),
    }
}

/// 一連の受信全体にかける期限
pub(crate) struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub(crate) fn after(timeout: Option<Duration>) -> Option<Deadline> {
        timeout.map(|timeout| Deadline {
            at: Instant::now() + timeout,
            timeout,
        })
    }
}

/// 期限までに1行受け取る。期限が無ければ出力が閉じるまで待つ。
pub(crate) fn receive_before<C: LineChannel + ?Sized>(
    channel: &mut C,
    deadline: Option<&Deadline>,
) -> Result<String> {
    let Some(deadline) = deadline else {
        return channel.receive();
    };
    let remaining = deadline.at.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(EngineError::Timeout(deadline.timeout));
    }
    channel.receive_timeout(Some(remaining)).map_err(|e| match e {
        EngineError::Timeout(_) => EngineError::Timeout(deadline.timeout),
        e => e,
    })
}
