//! 設定からエンジンを組み立て、起動失敗を指数バックオフで再試行する

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{EngineConfig, ProtocolKind};
use crate::error::{EngineError, Result};
use crate::protocol::EngineProtocol;
use crate::registry::EngineRegistry;
use crate::types::{TimeControl, Variant};
use crate::usi::UsiClient;
use crate::wrapper::EngineWrapper;
use crate::xboard::XBoardClient;

/// 再試行の間隔。待ち時間は `[0, min(initial * 2^n, max_delay)]` から一様に選ぶ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max_delay: Duration,
    /// 最初の試行からの経過時間がこれを超えたら諦める
    pub max_elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_elapsed: Duration::from_secs(120),
        }
    }
}

impl BackoffPolicy {
    /// `attempt` 回目 (0 始まり) の失敗後に待つ時間。諦めるなら `None`。
    pub fn delay(&self, attempt: u32, elapsed: Duration) -> Option<Duration> {
        let remaining = self.max_elapsed.checked_sub(elapsed).filter(|d| !d.is_zero())?;
        let ceiling = self
            .initial
            .checked_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        let ceiling_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        let jittered = Duration::from_millis(rand::rng().random_range(0..=ceiling_ms));
        Some(jittered.min(remaining))
    }
}

/// 設定どおりにエンジンを起動し、オプション設定と生存確認まで行う。
pub fn create_engine(
    config: &EngineConfig,
    variant: Variant,
    time_control: TimeControl,
    registry: &EngineRegistry,
) -> Result<EngineWrapper> {
    let engine: Box<dyn EngineProtocol> = match config.protocol {
        ProtocolKind::Homemade => {
            log::info!("Starting built-in engine: {}", config.name.trim());
            registry.create(config.name.trim(), variant, time_control)?
        }
        ProtocolKind::Usi => {
            let command = config.command();
            log::info!("Starting engine: {}", command.display());
            let mut client = UsiClient::spawn(&command, config.protocol_options())?;
            apply_options(&mut client, config)?;
            client.sync_ready()?;
            Box::new(client)
        }
        ProtocolKind::Xboard => {
            let command = config.command();
            log::info!("Starting engine: {}", command.display());
            let mut client =
                XBoardClient::spawn(&command, time_control, config.protocol_options())?;
            apply_options(&mut client, config)?;
            client.ping()?;
            Box::new(client)
        }
    };
    Ok(EngineWrapper::new(engine, config.go_commands))
}

fn apply_options(engine: &mut dyn EngineProtocol, config: &EngineConfig) -> Result<()> {
    for (name, value) in &config.usi_options {
        engine.set_option(name, Some(value))?;
    }
    Ok(())
}

/// [`create_engine`] を失敗のたびに待ってやり直す。
///
/// 組み込みエンジン名の誤りは設定の問題なので再試行しない。
pub fn create_engine_with_backoff(
    config: &EngineConfig,
    variant: Variant,
    time_control: TimeControl,
    registry: &EngineRegistry,
    policy: BackoffPolicy,
) -> Result<EngineWrapper> {
    let started = Instant::now();
    let mut attempt = 0;
    loop {
        let err = match create_engine(config, variant, time_control, registry) {
            Ok(engine) => return Ok(engine),
            Err(err @ EngineError::UnknownBuiltin(_)) => return Err(err),
            Err(err) => err,
        };
        let Some(delay) = policy.delay(attempt, started.elapsed()) else {
            log::error!("Giving up starting engine after {} attempts: {err}", attempt + 1);
            return Err(err);
        };
        log::warn!("Engine startup failed ({err}); retrying in {delay:?}");
        thread::sleep(delay);
        attempt += 1;
    }
}
