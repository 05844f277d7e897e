//! テスト用の台本どおりに応答する LineChannel

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::channel::LineChannel;
use crate::error::{EngineError, Result};

/// この行に当たると、期限付きの受信はタイムアウトする
pub(crate) const SILENCE: &str = "<silence>";

/// 送信された行の記録 (チャンネルを move した後も読める)
#[derive(Clone, Default)]
pub(crate) struct SentLog(Arc<Mutex<Vec<String>>>);

impl SentLog {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

pub(crate) struct ScriptedChannel {
    incoming: VecDeque<String>,
    sent: SentLog,
}

impl ScriptedChannel {
    pub(crate) fn new<I, S>(lines: I) -> (Self, SentLog)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sent = SentLog::default();
        let channel = Self {
            incoming: lines.into_iter().map(Into::into).collect(),
            sent: sent.clone(),
        };
        (channel, sent)
    }
}

impl LineChannel for ScriptedChannel {
    fn send(&mut self, line: &str) -> Result<()> {
        self.sent.0.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn receive_timeout(&mut self, timeout: Option<Duration>) -> Result<String> {
        while let Some(line) = self.incoming.pop_front() {
            if line == SILENCE {
                match timeout {
                    Some(t) => return Err(EngineError::Timeout(t)),
                    None => continue,
                }
            }
            let line = line.trim_end();
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }
        match timeout {
            Some(t) => Err(EngineError::Timeout(t)),
            None => Err(EngineError::EndOfStream),
        }
    }

    fn kill(&mut self) -> Result<()> {
        self.incoming.clear();
        Ok(())
    }
}
