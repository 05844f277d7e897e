//! エンジン設定ファイル (TOML)
//!
//! ```toml
//! [engine]
//! dir = "./engines"
//! name = "sjaakii -log"
//! protocol = "xboard"
//! silence_stderr = true
//!
//! [engine.engine_options]
//! threads = 2
//!
//! [engine.usi_options]
//! Hash = 256
//!
//! [engine.go_commands]
//! depth = 12
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::channel::EngineCommand;
use crate::protocol::{
    OptionValue, ProtocolOptions, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_PING_TIMEOUT,
    DEFAULT_VARIANT_REPLY_TIMEOUT,
};
use crate::wrapper::GoCommands;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
}

/// エンジンの方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Usi,
    Xboard,
    /// プロセスを起動しない組み込みエンジン
    Homemade,
}

/// 対局 bot 側の設定と同じ表を読むので、知らないキーは無視する。
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub dir: PathBuf,
    /// 実行ファイル名。空白区切りで引数を続けられる。
    /// `homemade` では組み込みエンジンの登録名。
    pub name: String,
    pub protocol: ProtocolKind,
    /// 未指定ならカレントディレクトリ
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// `--key=value` としてコマンドラインに渡す
    #[serde(default)]
    pub engine_options: BTreeMap<String, OptionValue>,
    /// ハンドシェイク後に設定するエンジンオプション
    #[serde(default)]
    pub usi_options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub go_commands: GoCommands,
    #[serde(default)]
    pub silence_stderr: bool,
    #[serde(default)]
    pub handshake_timeout_ms: Option<u64>,
    #[serde(default)]
    pub ping_timeout_ms: Option<u64>,
    #[serde(default)]
    pub variant_reply_timeout_ms: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        anyhow::ensure!(!config.engine.name.trim().is_empty(), "engine.name must not be empty");
        Ok(config)
    }
}

impl EngineConfig {
    /// 起動するコマンドラインを組み立てる。シェルは経由しない。
    pub fn command(&self) -> EngineCommand {
        let mut tokens = self.name.split_whitespace();
        let program = self.dir.join(tokens.next().unwrap_or_default());
        let mut command = EngineCommand::new(program);
        for arg in tokens {
            command = command.arg(arg);
        }
        for (key, value) in &self.engine_options {
            command = command.arg(format!("--{key}={value}"));
        }
        command.working_dir = self.working_dir.clone();
        command.silence_stderr = self.silence_stderr;
        command
    }

    /// 待ち時間の上限。未指定は既定値、0 は無制限。
    pub fn protocol_options(&self) -> ProtocolOptions {
        ProtocolOptions {
            handshake_timeout: timeout_ms(self.handshake_timeout_ms, DEFAULT_HANDSHAKE_TIMEOUT),
            ping_timeout: timeout_ms(self.ping_timeout_ms, DEFAULT_PING_TIMEOUT),
            variant_reply_timeout: timeout_ms(
                self.variant_reply_timeout_ms,
                DEFAULT_VARIANT_REPLY_TIMEOUT,
            ),
        }
    }
}

fn timeout_ms(value: Option<u64>, default: Duration) -> Option<Duration> {
    match value {
        None => Some(default),
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
    }
}
