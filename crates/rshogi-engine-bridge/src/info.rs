//! 探索中の `info` 行の解析
//!
//! [`SearchInfo`] は「タグごとの最新値」を保持する。行をまたいで全体をリセットすることはなく、
//! タグが再び現れたときにそのタグの値だけを消してから読み直す。そのため、ある行に含まれなかった
//! タグは前の行の値のまま残る。

use std::fmt;

use serde::Serialize;

/// `info` 行で認識するタグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoTag {
    Depth,
    SelDepth,
    Time,
    Nodes,
    MultiPv,
    CurrMove,
    CurrMoveNumber,
    HashFull,
    Nps,
    TbHits,
    CpuLoad,
    Refutation,
    CurrLine,
    String,
    Score,
    Pv,
}

impl InfoTag {
    pub const ALL: [InfoTag; 16] = [
        InfoTag::Depth,
        InfoTag::SelDepth,
        InfoTag::Time,
        InfoTag::Nodes,
        InfoTag::MultiPv,
        InfoTag::CurrMove,
        InfoTag::CurrMoveNumber,
        InfoTag::HashFull,
        InfoTag::Nps,
        InfoTag::TbHits,
        InfoTag::CpuLoad,
        InfoTag::Refutation,
        InfoTag::CurrLine,
        InfoTag::String,
        InfoTag::Score,
        InfoTag::Pv,
    ];

    /// 統計表示の既定のタグ
    pub const DEFAULT_STATS: [InfoTag; 4] =
        [InfoTag::Score, InfoTag::Depth, InfoTag::Nodes, InfoTag::Nps];

    pub fn from_keyword(token: &str) -> Option<InfoTag> {
        InfoTag::ALL.into_iter().find(|tag| tag.keyword() == token)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            InfoTag::Depth => "depth",
            InfoTag::SelDepth => "seldepth",
            InfoTag::Time => "time",
            InfoTag::Nodes => "nodes",
            InfoTag::MultiPv => "multipv",
            InfoTag::CurrMove => "currmove",
            InfoTag::CurrMoveNumber => "currmovenumber",
            InfoTag::HashFull => "hashfull",
            InfoTag::Nps => "nps",
            InfoTag::TbHits => "tbhits",
            InfoTag::CpuLoad => "cpuload",
            InfoTag::Refutation => "refutation",
            InfoTag::CurrLine => "currline",
            InfoTag::String => "string",
            InfoTag::Score => "score",
            InfoTag::Pv => "pv",
        }
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            InfoTag::Depth
                | InfoTag::SelDepth
                | InfoTag::Time
                | InfoTag::Nodes
                | InfoTag::MultiPv
                | InfoTag::CurrMoveNumber
                | InfoTag::HashFull
                | InfoTag::Nps
                | InfoTag::TbHits
                | InfoTag::CpuLoad
        )
    }
}

impl fmt::Display for InfoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Cp,
    Mate,
}

/// 評価値。`lowerbound` / `upperbound` が立っているものは境界値にすぎない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub kind: ScoreKind,
    pub value: i64,
    pub lowerbound: bool,
    pub upperbound: bool,
}

impl Score {
    pub fn is_bound(&self) -> bool {
        self.lowerbound || self.upperbound
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScoreKind::Cp => write!(f, "cp {}", self.value)?,
            ScoreKind::Mate => write!(f, "mate {}", self.value)?,
        }
        if self.lowerbound {
            f.write_str(" lowerbound")?;
        }
        if self.upperbound {
            f.write_str(" upperbound")?;
        }
        Ok(())
    }
}

/// 探索統計のスナップショット
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seldepth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multipv: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currmove: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currmovenumber: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashfull: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbhits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuload: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refutation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pv: Option<String>,
}

impl SearchInfo {
    fn integer_mut(&mut self, tag: InfoTag) -> Option<&mut Option<i64>> {
        match tag {
            InfoTag::Depth => Some(&mut self.depth),
            InfoTag::SelDepth => Some(&mut self.seldepth),
            InfoTag::Time => Some(&mut self.time),
            InfoTag::Nodes => Some(&mut self.nodes),
            InfoTag::MultiPv => Some(&mut self.multipv),
            InfoTag::CurrMoveNumber => Some(&mut self.currmovenumber),
            InfoTag::HashFull => Some(&mut self.hashfull),
            InfoTag::Nps => Some(&mut self.nps),
            InfoTag::TbHits => Some(&mut self.tbhits),
            InfoTag::CpuLoad => Some(&mut self.cpuload),
            _ => None,
        }
    }

    fn text_mut(&mut self, tag: InfoTag) -> Option<&mut Option<String>> {
        match tag {
            InfoTag::CurrMove => Some(&mut self.currmove),
            InfoTag::Refutation => Some(&mut self.refutation),
            InfoTag::CurrLine => Some(&mut self.currline),
            InfoTag::String => Some(&mut self.string),
            InfoTag::Pv => Some(&mut self.pv),
            _ => None,
        }
    }

    fn clear(&mut self, tag: InfoTag) {
        if let Some(slot) = self.integer_mut(tag) {
            *slot = None;
        } else if let Some(slot) = self.text_mut(tag) {
            *slot = None;
        }
    }

    fn append(&mut self, tag: InfoTag, token: &str) {
        if let Some(slot) = self.text_mut(tag) {
            match slot {
                Some(text) => {
                    text.push(' ');
                    text.push_str(token);
                }
                None => *slot = Some(token.to_string()),
            }
        }
    }

    /// multipv が無ければ 1 とみなす
    fn is_primary_pv(&self) -> bool {
        self.multipv.unwrap_or(1) == 1
    }

    /// タグの値を表示用の文字列にする。値が無ければ `None`。
    pub fn value(&self, tag: InfoTag) -> Option<String> {
        let int = |v: Option<i64>| v.map(|v| v.to_string());
        match tag {
            InfoTag::Depth => int(self.depth),
            InfoTag::SelDepth => int(self.seldepth),
            InfoTag::Time => int(self.time),
            InfoTag::Nodes => int(self.nodes),
            InfoTag::MultiPv => int(self.multipv),
            InfoTag::CurrMoveNumber => int(self.currmovenumber),
            InfoTag::HashFull => int(self.hashfull),
            InfoTag::Nps => int(self.nps),
            InfoTag::TbHits => int(self.tbhits),
            InfoTag::CpuLoad => int(self.cpuload),
            InfoTag::CurrMove => self.currmove.clone(),
            InfoTag::Refutation => self.refutation.clone(),
            InfoTag::CurrLine => self.currline.clone(),
            InfoTag::String => self.string.clone(),
            InfoTag::Pv => self.pv.clone(),
            InfoTag::Score => self.score.map(|score| score.to_string()),
        }
    }

    /// `tag: value` 形式の行を、値のあるタグについてだけ返す。
    pub fn stats(&self, tags: &[InfoTag]) -> Vec<String> {
        tags.iter()
            .filter_map(|tag| self.value(*tag).map(|value| format!("{tag}: {value}")))
            .collect()
    }

    /// `info` に続く引数を読み、スナップショットを更新する。
    pub fn update(&mut self, args: &str) {
        let mut cursor: Option<InfoTag> = None;
        let mut score_kind: Option<ScoreKind> = None;
        let mut score_value: Option<i64> = None;
        let mut lowerbound = false;
        let mut upperbound = false;

        for token in args.split_whitespace() {
            // string 以降は行末まですべて文字列
            if cursor == Some(InfoTag::String) {
                self.append(InfoTag::String, token);
                continue;
            }
            match InfoTag::from_keyword(token) {
                Some(InfoTag::Score) => cursor = Some(InfoTag::Score),
                Some(InfoTag::Pv) => {
                    cursor = Some(InfoTag::Pv);
                    if self.is_primary_pv() {
                        self.pv = None;
                    }
                }
                Some(tag) => {
                    cursor = Some(tag);
                    self.clear(tag);
                }
                None => match cursor {
                    Some(InfoTag::Score) => match token {
                        "cp" => {
                            score_kind = Some(ScoreKind::Cp);
                            score_value = None;
                        }
                        "mate" => {
                            score_kind = Some(ScoreKind::Mate);
                            score_value = None;
                        }
                        "lowerbound" => lowerbound = true,
                        "upperbound" => upperbound = true,
                        _ => match token.parse::<i64>() {
                            Ok(v) => score_value = Some(v),
                            Err(_) => log::debug!("ignoring score token `{token}`"),
                        },
                    },
                    Some(InfoTag::Pv) => {
                        if self.is_primary_pv() {
                            self.append(InfoTag::Pv, token);
                        }
                    }
                    Some(tag) if tag.is_integer() => match token.parse::<i64>() {
                        Ok(v) => {
                            if let Some(slot) = self.integer_mut(tag) {
                                *slot = Some(v);
                            }
                        }
                        Err(_) => log::debug!("ignoring non-integer `{token}` for {tag}"),
                    },
                    Some(tag) => self.append(tag, token),
                    None => log::debug!("ignoring info token `{token}` before any tag"),
                },
            }
        }

        // 確定値は境界値で上書きしない
        if let (Some(kind), Some(value)) = (score_kind, score_value) {
            let is_bound = lowerbound || upperbound;
            let replace = !is_bound || self.score.is_none_or(|prev| prev.is_bound());
            if replace {
                self.score = Some(Score {
                    kind,
                    value,
                    lowerbound,
                    upperbound,
                });
            }
        }
    }
}
