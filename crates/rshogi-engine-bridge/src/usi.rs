//! USI 方言のクライアント

use std::collections::HashSet;

use crate::channel::{ChildProcessChannel, EngineCommand, LineChannel};
use crate::error::{EngineError, Result};
use crate::info::SearchInfo;
use crate::protocol::{
    receive_before, split_command, Deadline, EngineProtocol, OptionValue, ProtocolOptions,
};
use crate::types::{BestMoveResult, SearchRequest, Variant};

/// 変則ルールを選ぶ USI オプション
pub const USI_VARIANT_OPTION: &str = "USI_Variant";

pub struct UsiClient<C: LineChannel = ChildProcessChannel> {
    channel: C,
    options: ProtocolOptions,
    name: Option<String>,
    author: Option<String>,
    option_names: HashSet<String>,
    info: SearchInfo,
}

impl UsiClient<ChildProcessChannel> {
    /// エンジンを起動して `usiok` まで読む。
    pub fn spawn(command: &EngineCommand, options: ProtocolOptions) -> Result<Self> {
        let channel = ChildProcessChannel::spawn(command)?;
        Self::handshake(channel, options).map_err(|source| EngineError::Startup {
            command: command.display(),
            source: Box::new(source),
        })
    }
}

impl<C: LineChannel> UsiClient<C> {
    pub fn handshake(channel: C, options: ProtocolOptions) -> Result<Self> {
        let mut client = Self {
            channel,
            options,
            name: None,
            author: None,
            option_names: HashSet::new(),
            info: SearchInfo::default(),
        };
        client.channel.send("usi")?;
        let deadline = Deadline::after(options.handshake_timeout);
        loop {
            let line = receive_before(&mut client.channel, deadline.as_ref())?;
            let (command, args) = split_command(&line);
            match command {
                "usiok" => break,
                "id" => match split_command(args) {
                    ("name", name) => client.name = Some(name.to_string()),
                    ("author", author) => client.author = Some(author.to_string()),
                    _ => log::debug!("Ignoring id line: {line}"),
                },
                "option" => {
                    if let Some(name) = parse_option_name(args) {
                        client.option_names.insert(name);
                    }
                }
                _ => log::warn!("Unexpected engine response to usi: {line}"),
            }
        }
        Ok(client)
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// エンジンが `option` で申告したか
    pub fn has_option(&self, name: &str) -> bool {
        self.option_names.contains(name)
    }

    /// `isready` を送り `readyok` を待つ
    pub fn sync_ready(&mut self) -> Result<()> {
        self.channel.send("isready")?;
        let deadline = Deadline::after(self.options.ping_timeout);
        loop {
            let line = receive_before(&mut self.channel, deadline.as_ref())?;
            if line == "readyok" {
                return Ok(());
            }
            if !line.starts_with("info") {
                log::warn!("Unexpected engine response to isready: {line}");
            }
        }
    }
}

impl<C: LineChannel> EngineProtocol for UsiClient<C> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 申告されたオプションにだけ送る。何も申告していないエンジンにはそのまま送る。
    fn set_option(&mut self, name: &str, value: Option<&OptionValue>) -> Result<()> {
        if !self.option_names.is_empty() && !self.option_names.contains(name) {
            log::debug!("Skipping option not advertised by engine: {name}");
            return Ok(());
        }
        match value {
            Some(value) => self.channel.send(&format!("setoption name {name} value {value}")),
            None => self.channel.send(&format!("setoption name {name}")),
        }
    }

    fn set_variant_options(&mut self, variant: Variant) -> Result<()> {
        if variant != Variant::Standard {
            if self.has_option(USI_VARIANT_OPTION) {
                let value = OptionValue::from(variant.usi_name());
                self.set_option(USI_VARIANT_OPTION, Some(&value))?;
            } else {
                log::warn!("Engine does not advertise {USI_VARIANT_OPTION}; starting {variant:?}");
            }
        }
        self.sync_ready()?;
        self.channel.send("usinewgame")
    }

    fn ping(&mut self) -> Result<()> {
        self.sync_ready()
    }

    fn go(&mut self, request: &SearchRequest<'_>) -> Result<BestMoveResult> {
        self.info = SearchInfo::default();
        self.channel.send(&position_command(request.sfen, request.moves))?;
        self.channel.send(&go_command(request))?;

        loop {
            let line = self.channel.receive()?;
            let (command, args) = split_command(&line);
            match command {
                "bestmove" => {
                    let mut tokens = args.split_whitespace();
                    let best_move = usi_move(tokens.next());
                    let ponder_move = match (tokens.next(), tokens.next()) {
                        (Some("ponder"), mv) => usi_move(mv),
                        _ => None,
                    };
                    return Ok(BestMoveResult {
                        best_move,
                        ponder_move,
                    });
                }
                "info" => self.info.update(args),
                _ => log::warn!("Unexpected engine response to go: {line}"),
            }
        }
    }

    fn info(&self) -> &SearchInfo {
        &self.info
    }

    fn report_game_result(&mut self, sfen: &str, moves: &[String]) -> Result<()> {
        self.channel.send(&position_command(sfen, moves))
    }

    fn stop(&mut self) -> Result<()> {
        self.channel.send("stop")
    }

    fn ponderhit(&mut self) -> Result<()> {
        self.channel.send("ponderhit")
    }

    fn quit(&mut self) -> Result<()> {
        self.channel.send("quit")
    }

    fn kill(&mut self) -> Result<()> {
        self.channel.kill()
    }
}

/// `resign` / `win` と空の応答は指し手なし
fn usi_move(token: Option<&str>) -> Option<String> {
    match token {
        None | Some("resign") | Some("win") | Some("(none)") => None,
        Some(mv) => Some(mv.to_string()),
    }
}

fn position_command(sfen: &str, moves: &[String]) -> String {
    let mut cmd = match sfen {
        "startpos" => "position startpos".to_string(),
        sfen => format!("position sfen {sfen}"),
    };
    if !moves.is_empty() {
        cmd.push_str(" moves ");
        cmd.push_str(&moves.join(" "));
    }
    cmd
}

fn go_command(request: &SearchRequest<'_>) -> String {
    let limits = &request.limits;
    let mut cmd = String::from("go");
    if limits.ponder {
        cmd.push_str(" ponder");
    }
    let mut push = |key: &str, value: Option<u64>| {
        if let Some(v) = value {
            cmd.push_str(&format!(" {key} {v}"));
        }
    };
    push("btime", limits.btime);
    push("wtime", limits.wtime);
    // byoyomi と加算は併用しない
    if limits.byoyomi.is_some() {
        push("byoyomi", limits.byoyomi);
    } else {
        push("binc", limits.binc);
        push("winc", limits.winc);
    }
    push("movetime", limits.movetime);
    push("depth", limits.depth.map(u64::from));
    push("nodes", limits.nodes);
    cmd
}

/// `option name <名前> type ...` から名前を取り出す。名前は空白を含みうる。
pub fn parse_option_name(line: &str) -> Option<String> {
    let parts: Vec<&str> = line
        .split_whitespace()
        .skip_while(|tok| *tok != "name")
        .skip(1)
        .take_while(|tok| *tok != "type")
        .collect();
    if parts.is_empty() { None } else { Some(parts.join(" ")) }
}
