//! Fake engines for the process-level tests
//!
//! Each fake engine is a POSIX shell script in a temporary directory. Every line it
//! receives is appended to a log file next to the script so tests can check what the
//! client sent.

#![allow(dead_code)] // Not every test file uses every helper

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use rshogi_engine_bridge::EngineCommand;
use tempfile::TempDir;

/// XBoard engine: answers the handshake, `variant` with a setup line, `ping`, and `go`.
pub const XBOARD_ENGINE: &str = r##"
while IFS= read -r line; do
  echo "$line" >> "$LOG"
  case "$line" in
    protover*)
      echo "# fake xboard engine"
      echo "feature myname=\"Fake XBoard\" setboard=1 usermove=1"
      echo "feature done=1"
      ;;
    variant*)
      echo "setup (PNBRLSGKpnbrlsgk) 9x9+7_shogi lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL w 0 1"
      ;;
    ping*)
      echo "pong ${line#ping }"
      ;;
    go)
      echo "info depth 3 nodes 120 score cp 15 pv g7g6"
      echo "Error: pretend trouble"
      echo "move g7g6"
      ;;
    quit)
      exit 0
      ;;
  esac
done
"##;

/// USI engine: advertises two options and answers `isready` / `go`.
pub const USI_ENGINE: &str = r##"
while IFS= read -r line; do
  echo "$line" >> "$LOG"
  case "$line" in
    usi)
      echo "id name Fake USI"
      echo "id author Tester"
      echo "option name USI_Hash type spin default 16 min 1 max 1024"
      echo "option name USI_Variant type combo default shogi var shogi var minishogi"
      echo "usiok"
      ;;
    isready)
      echo "readyok"
      ;;
    go*)
      echo "info depth 5 nodes 1000 nps 20000 score cp 33 pv 7g7f 3c3d"
      echo "bestmove 7g7f ponder 3c3d"
      ;;
    quit)
      exit 0
      ;;
  esac
done
"##;

pub const T_PROCESS: Duration = Duration::from_secs(5);

pub struct FakeEngine {
    dir: TempDir,
    script: PathBuf,
    log: PathBuf,
}

impl FakeEngine {
    /// `body` runs with `$LOG` set to the receive log.
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let script = dir.path().join("engine.sh");
        let log = dir.path().join("received.log");
        let text = format!("LOG='{}'\n{body}", log.display());
        fs::write(&script, text).expect("failed to write engine script");
        Self { dir, script, log }
    }

    /// Runs the script through `sh`, so it never needs the executable bit.
    pub fn command(&self) -> EngineCommand {
        EngineCommand::new("sh").arg(self.script.display().to_string())
    }

    /// Lines the engine has received so far
    pub fn received(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn position(&self, line: &str) -> Option<usize> {
        self.received().iter().position(|l| l == line)
    }

    /// Polls the receive log until `line` shows up.
    pub fn wait_for_line(&self, line: &str, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if self.position(line).is_some() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    /// Writes an engine config pointing at this script and returns its path.
    pub fn write_config(&self, protocol: &str, extra: &str) -> PathBuf {
        let path = self.dir.path().join("engine.toml");
        let text = format!(
            "[engine]\nname = \"sh {}\"\nprotocol = \"{protocol}\"\n{extra}",
            self.script.display()
        );
        fs::write(&path, text).expect("failed to write config");
        path
    }
}
