//! 方言を問わずエンジンを同じ手順で動かす層
//!
//! 1回の探索は必ず次の順で進む。
//!
//! 1. その対局でまだなら変則ルールを設定する
//! 2. 生存確認 (`ping`)
//! 3. 探索 (`go`)
//! 4. 統計をログに出す

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::info::{InfoTag, SearchInfo};
use crate::protocol::EngineProtocol;
use crate::types::{BestMoveResult, Color, SearchLimits, SearchRequest, Variant};

/// 設定ファイルで固定する探索制限
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoCommands {
    /// ミリ秒
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
}

/// 対局の状態。`moves` は `initial_sfen` から指された手 (正規形)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub variant: Variant,
    pub initial_sfen: String,
    pub moves: Vec<String>,
}

impl GameState {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            initial_sfen: "startpos".to_string(),
            moves: Vec::new(),
        }
    }

    /// 現局面の手番
    pub fn turn(&self) -> Color {
        let initial = match self.initial_sfen.split_whitespace().nth(1) {
            Some("w") => Color::White,
            _ => Color::Black,
        };
        if self.moves.len() % 2 == 0 { initial } else { !initial }
    }
}

/// 両者の残り時間。単位はミリ秒。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clocks {
    pub btime: Option<u64>,
    pub wtime: Option<u64>,
    pub binc: Option<u64>,
    pub winc: Option<u64>,
    pub byoyomi: Option<u64>,
}

pub struct EngineWrapper {
    engine: Box<dyn EngineProtocol>,
    go_commands: GoCommands,
    applied_variant: Option<Variant>,
}

impl EngineWrapper {
    pub fn new(engine: Box<dyn EngineProtocol>, go_commands: GoCommands) -> Self {
        Self {
            engine,
            go_commands,
            applied_variant: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.engine.name()
    }

    pub fn go_commands(&self) -> GoCommands {
        self.go_commands
    }

    /// 次の探索で変則ルールを設定し直す
    pub fn new_game(&mut self) {
        self.applied_variant = None;
    }

    /// 探索を1回実行する。
    ///
    /// 生存確認に失敗した場合は探索せずに `EngineError::UnexpectedTermination` を返す。
    /// この層では再試行しない。
    pub fn search(
        &mut self,
        variant: Variant,
        request: &SearchRequest<'_>,
    ) -> Result<BestMoveResult> {
        if self.applied_variant != Some(variant) {
            self.engine.set_variant_options(variant)?;
            self.applied_variant = Some(variant);
        }
        if let Err(e) = self.engine.ping() {
            log::error!("Unexpected engine termination: {e}");
            return Err(EngineError::UnexpectedTermination);
        }
        let result = self.engine.go(request)?;
        self.print_stats(&InfoTag::DEFAULT_STATS);
        Ok(result)
    }

    /// 1手あたりの固定時間 (ミリ秒) で探索する
    pub fn search_for(&mut self, game: &GameState, movetime: u64) -> Result<BestMoveResult> {
        let limits = SearchLimits {
            movetime: Some(movetime),
            ..Default::default()
        };
        self.search_game(game, limits)
    }

    /// 持ち時間と設定ファイルの制限で探索する
    pub fn search_with_ponder(
        &mut self,
        game: &GameState,
        clocks: Clocks,
        ponder: bool,
    ) -> Result<BestMoveResult> {
        let limits = SearchLimits {
            movetime: self.go_commands.movetime,
            depth: self.go_commands.depth,
            nodes: self.go_commands.nodes,
            btime: clocks.btime,
            wtime: clocks.wtime,
            binc: clocks.binc,
            winc: clocks.winc,
            byoyomi: clocks.byoyomi,
            ponder,
        };
        self.search_game(game, limits)
    }

    fn search_game(&mut self, game: &GameState, limits: SearchLimits) -> Result<BestMoveResult> {
        let request = SearchRequest {
            sfen: &game.initial_sfen,
            moves: &game.moves,
            turn: game.turn(),
            limits,
        };
        self.search(game.variant, &request)
    }

    pub fn info(&self) -> &SearchInfo {
        self.engine.info()
    }

    /// 直近の探索の `tag: value` 行
    pub fn stats(&self, tags: &[InfoTag]) -> Vec<String> {
        self.engine.info().stats(tags)
    }

    pub fn print_stats(&self, tags: &[InfoTag]) {
        for line in self.stats(tags) {
            log::info!("{line}");
        }
    }

    /// 終局した対局の最終局面をエンジンに伝える
    pub fn report_game_result(&mut self, game: &GameState) -> Result<()> {
        self.engine.report_game_result(&game.initial_sfen, &game.moves)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.engine.stop()
    }

    pub fn ponderhit(&mut self) -> Result<()> {
        self.engine.ponderhit()
    }

    pub fn quit(&mut self) -> Result<()> {
        self.engine.quit()
    }

    pub fn kill_process(&mut self) -> Result<()> {
        self.engine.kill()
    }
}
