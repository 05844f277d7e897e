//! 探索要求・結果など、方言に依存しない型

use serde::Serialize;

/// 平手の開始局面
pub const SFEN_STANDARD: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";
/// 5五将棋の開始局面
pub const SFEN_MINISHOGI: &str = "rbsgk/4p/5/P4/KGSBR b - 1";
/// 中将棋の開始局面
pub const SFEN_CHUSHOGI: &str = "lfcsgekgscfl/a1b1txot1b1a/mvrhdqndhrvm/pppppppppppp/3i4i3/12/12/3I4I3/PPPPPPPPPPPP/MVRHDNQDHRVM/A1B1TOXT1B1A/LFCSGKEGSCFL b - 1";

/// 手番（先手/後手）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opponent()
    }
}

/// 対応している変則ルール。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Standard,
    Minishogi,
    Chushogi,
}

impl Variant {
    /// ゲームサーバー側の変則名から引く。知らない名前は平手扱い。
    pub fn from_name(name: &str) -> Variant {
        match name.trim().to_ascii_lowercase().as_str() {
            "minishogi" => Variant::Minishogi,
            "chushogi" | "chu" => Variant::Chushogi,
            _ => Variant::Standard,
        }
    }

    /// XBoard の `variant` コマンドに渡す識別子
    pub fn xboard_name(self) -> &'static str {
        match self {
            Variant::Standard => "shogi",
            Variant::Minishogi => "minishogi",
            Variant::Chushogi => "chu",
        }
    }

    /// USI_Variant オプションに渡す名前
    pub fn usi_name(self) -> &'static str {
        match self {
            Variant::Standard => "shogi",
            Variant::Minishogi => "minishogi",
            Variant::Chushogi => "chushogi",
        }
    }

    /// 開始局面 (正規形の SFEN)
    pub fn start_sfen(self) -> &'static str {
        match self {
            Variant::Standard => SFEN_STANDARD,
            Variant::Minishogi => SFEN_MINISHOGI,
            Variant::Chushogi => SFEN_CHUSHOGI,
        }
    }
}

/// 対局の持ち時間。XBoard の `level` コマンドの単位のまま保持する
/// (base は分、increment / byoyomi は秒)。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeControl {
    pub base: u64,
    pub increment: u64,
    pub byoyomi: u64,
}

impl TimeControl {
    pub fn new(base: u64, increment: u64, byoyomi: u64) -> Self {
        Self {
            base,
            increment,
            byoyomi,
        }
    }

    /// `level 0 <base> <increment+byoyomi>`
    pub fn level_command(&self) -> String {
        format!("level 0 {} {}", self.base, self.increment.saturating_add(self.byoyomi))
    }
}

/// 探索の制限。時間はすべてミリ秒。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub btime: Option<u64>,
    pub wtime: Option<u64>,
    pub binc: Option<u64>,
    pub winc: Option<u64>,
    pub byoyomi: Option<u64>,
    pub ponder: bool,
}

impl SearchLimits {
    /// (手番側の残り時間, 相手側の残り時間)
    pub fn clocks_for(&self, side: Color) -> (Option<u64>, Option<u64>) {
        match side {
            Color::Black => (self.btime, self.wtime),
            Color::White => (self.wtime, self.btime),
        }
    }
}

/// 1回の探索要求。
///
/// `sfen` は基準局面 (`startpos` も可)、`moves` はそこから指された手を順に並べたもの。
pub struct SearchRequest<'a> {
    pub sfen: &'a str,
    pub moves: &'a [String],
    pub turn: Color,
    pub limits: SearchLimits,
}

/// 探索の最終結果。`best_move` が `None` なら指す手が無い (投了相当)。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BestMoveResult {
    pub best_move: Option<String>,
    pub ponder_move: Option<String>,
}
