//! XBoard/CECP 方言のクライアント
//!
//! セッションは `Spawned → Negotiating → Ready ⇄ Searching → Terminated` と遷移する。
//! ハンドシェイクで決まった機能フラグはその後変更しない。
//! `force_mode` は変則設定で立ち、探索開始時の `go` 送信で下ろす。
//! 一度盤面を動かしたエンジンに変則を設定し直すときは、先に `new` で対局を捨てる。

use crate::channel::{ChildProcessChannel, EngineCommand, LineChannel};
use crate::codec::{decode_move, from_xboard_setup, move_command, to_xboard_position};
use crate::error::{EngineError, Result};
use crate::info::SearchInfo;
use crate::protocol::{
    receive_before, split_command, Deadline, EngineProtocol, OptionValue, ProtocolOptions,
};
use crate::types::{BestMoveResult, SearchRequest, TimeControl, Variant};

/// `variant` の応答として `#` / `Error` の後に追加で読む行数の上限
const MAX_VARIANT_EXTRA_REPLIES: usize = 3;

/// ハンドシェイクで申告された機能
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub setboard: bool,
    pub usermove: bool,
}

pub struct XBoardClient<C: LineChannel = ChildProcessChannel> {
    channel: C,
    options: ProtocolOptions,
    capabilities: Capabilities,
    time_control: TimeControl,
    force_mode: bool,
    /// `new` 以降に盤面を動かしたか
    board_dirty: bool,
    start_sfen: String,
    name: Option<String>,
    info: SearchInfo,
}

impl XBoardClient<ChildProcessChannel> {
    /// エンジンを起動してハンドシェイクまで済ませる。
    pub fn spawn(
        command: &EngineCommand,
        time_control: TimeControl,
        options: ProtocolOptions,
    ) -> Result<Self> {
        let channel = ChildProcessChannel::spawn(command)?;
        Self::handshake(channel, time_control, options).map_err(|source| EngineError::Startup {
            command: command.display(),
            source: Box::new(source),
        })
    }
}

impl<C: LineChannel> XBoardClient<C> {
    /// `xboard` / `protover 2` / `level` / `new` を送り、`feature done=1` まで読む。
    pub fn handshake(
        channel: C,
        time_control: TimeControl,
        options: ProtocolOptions,
    ) -> Result<Self> {
        let mut client = Self {
            channel,
            options,
            capabilities: Capabilities::default(),
            time_control,
            force_mode: false,
            board_dirty: false,
            start_sfen: Variant::Standard.start_sfen().to_string(),
            name: None,
            info: SearchInfo::default(),
        };
        client.send("xboard")?;
        client.send("protover 2")?;
        client.send(&time_control.level_command())?;
        client.send("new")?;

        let deadline = Deadline::after(options.handshake_timeout);
        loop {
            let line = receive_before(&mut client.channel, deadline.as_ref())?;
            let (command, args) = split_command(&line);
            match command {
                "feature" => {
                    if client.apply_features(args) {
                        break;
                    }
                }
                c if c.starts_with('#') => log::info!("{line}"),
                "Error" | "Error:" => log::warn!("Engine error during protover 2: {line}"),
                _ => log::warn!("Unexpected engine response to protover 2: {line}"),
            }
        }
        log::debug!(
            "{}: setboard={} usermove={}",
            client.label(),
            client.capabilities.setboard,
            client.capabilities.usermove
        );
        Ok(client)
    }

    /// `feature` 行を反映する。`done=1` を含んでいれば true。
    fn apply_features(&mut self, args: &str) -> bool {
        let mut done = false;
        for (key, value) in parse_features(args) {
            match (key.as_str(), value.as_str()) {
                ("setboard", "1") => self.capabilities.setboard = true,
                ("usermove", "1") => self.capabilities.usermove = true,
                ("myname", name) => self.name = Some(name.to_string()),
                ("done", "1") => done = true,
                _ => {}
            }
        }
        done
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn is_force_mode(&self) -> bool {
        self.force_mode
    }

    /// 正規形の開始局面
    pub fn start_sfen(&self) -> &str {
        &self.start_sfen
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("xboard")
    }

    fn send(&mut self, line: &str) -> Result<()> {
        self.channel.send(line)
    }

    /// `go` 前に送る時間・局面同期のコマンド列を組み立てる。
    fn search_commands(&self, request: &SearchRequest<'_>) -> Result<Vec<String>> {
        let limits = &request.limits;
        let (time, otim) = limits.clocks_for(request.turn);
        let usermove = self.capabilities.usermove;
        let base_sfen = match request.sfen {
            "startpos" => self.start_sfen.as_str(),
            sfen => sfen,
        };

        let mut batch = Vec::new();
        if self.force_mode {
            batch.push(if limits.ponder { "hard" } else { "easy" }.to_string());
            batch.push("force".to_string());
        }
        if let Some(ms) = limits.movetime {
            batch.push(format!("st {}", movetime_seconds(ms)));
        }
        if let Some(depth) = limits.depth {
            batch.push(format!("sd {depth}"));
        }
        // XBoard の time / otim はセンチ秒
        if let Some(ms) = time {
            batch.push(format!("time {}", ms / 10));
        }
        if let Some(ms) = otim {
            batch.push(format!("otim {}", ms / 10));
        }

        if self.force_mode {
            // まだ何も同期していないので基準局面から全手を送る
            if self.capabilities.setboard {
                batch.push(format!("setboard {}", to_xboard_position(base_sfen)));
            } else if base_sfen != self.start_sfen {
                log::warn!("{}: engine lacks setboard; cannot send {base_sfen}", self.label());
            }
            for mv in request.moves {
                batch.push(move_command(mv, usermove)?);
            }
            batch.push("go".to_string());
        } else if let Some(last) = request.moves.last() {
            // 自分の指し手はエンジンが知っているので相手の最終手だけ送る
            batch.push(move_command(last, usermove)?);
        } else if self.capabilities.setboard {
            batch.push(format!("setboard {}", to_xboard_position(base_sfen)));
        }
        Ok(batch)
    }
}

impl<C: LineChannel> EngineProtocol for XBoardClient<C> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_option(&mut self, name: &str, value: Option<&OptionValue>) -> Result<()> {
        let name = name.to_lowercase();
        let name = match name.as_str() {
            "hash" => "memory",
            "threads" => "cores",
            other => other,
        };
        let value = value.map_or_else(|| "none".to_string(), ToString::to_string);
        self.send(&format!("{name} {value}"))
    }

    /// `variant` を送り、応答の `setup` があればそこから開始局面を作る。
    ///
    /// 応答を返さないエンジンもあるため、読むのは期限付きで最初の1行
    /// (`#` / `Error` が続く場合は数行) だけ。
    fn set_variant_options(&mut self, variant: Variant) -> Result<()> {
        if self.board_dirty {
            // CECP の variant は new の直後でないと効かない
            self.send("new")?;
            let level = self.time_control.level_command();
            self.send(&level)?;
            self.board_dirty = false;
        }
        self.start_sfen = variant.start_sfen().to_string();
        self.send(&format!("variant {}", variant.xboard_name()))?;
        self.force_mode = true;

        let deadline = Deadline::after(self.options.variant_reply_timeout);
        for _ in 0..=MAX_VARIANT_EXTRA_REPLIES {
            let line = match receive_before(&mut self.channel, deadline.as_ref()) {
                Ok(line) => line,
                Err(EngineError::Timeout(timeout)) => {
                    log::debug!("{}: no reply to variant within {timeout:?}", self.label());
                    break;
                }
                Err(e) => return Err(e),
            };
            let (command, args) = split_command(&line);
            match command {
                "setup" => {
                    match from_xboard_setup(args) {
                        Some(sfen) => self.start_sfen = sfen,
                        None => log::warn!("Unparsable setup reply to variant: {line}"),
                    }
                    break;
                }
                c if c.starts_with('#') => log::info!("{line}"),
                "Error" | "Error:" => log::error!("Unexpected engine response to variant: {line}"),
                _ => {
                    log::warn!("Unexpected engine response to variant: {line}");
                    break;
                }
            }
        }
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        self.send("ping 1")?;
        let deadline = Deadline::after(self.options.ping_timeout);
        loop {
            let line = receive_before(&mut self.channel, deadline.as_ref())?;
            if split_command(&line).0 == "pong" {
                return Ok(());
            }
            log::warn!("Unexpected engine response to ping: {line}");
        }
    }

    fn go(&mut self, request: &SearchRequest<'_>) -> Result<BestMoveResult> {
        self.info = SearchInfo::default();
        let batch = self.search_commands(request)?;
        for line in &batch {
            self.send(line)?;
        }
        self.force_mode = false;
        self.board_dirty = true;

        loop {
            let line = self.channel.receive()?;
            let (command, args) = split_command(&line);
            match command {
                "move" => {
                    if request.limits.movetime.is_some() {
                        // st は次の手番まで残るので元の持ち時間に戻す
                        let level = self.time_control.level_command();
                        self.send(&level)?;
                    }
                    let mut tokens = args.split_whitespace();
                    let best_move = decode_move(tokens.next().unwrap_or_default())?;
                    let ponder_move = match (tokens.next(), tokens.next()) {
                        (Some("ponder"), Some(mv)) => decode_move(mv)?,
                        _ => None,
                    };
                    return Ok(BestMoveResult {
                        best_move,
                        ponder_move,
                    });
                }
                "resign" => {
                    log::info!("{}: engine resigned", self.label());
                    return Ok(BestMoveResult::default());
                }
                "info" => self.info.update(args),
                c if c.starts_with('#') => log::info!("{line}"),
                "Error" | "Error:" => log::error!("Unexpected engine response to go: {line}"),
                _ => log::warn!("Unexpected engine response to go: {line}"),
            }
        }
    }

    fn info(&self) -> &SearchInfo {
        &self.info
    }

    /// `setboard` を申告したエンジンにだけ、force モードで最終局面まで並べて送る。
    fn report_game_result(&mut self, sfen: &str, moves: &[String]) -> Result<()> {
        if !self.capabilities.setboard {
            log::debug!("{}: engine lacks setboard; final position not sent", self.label());
            return Ok(());
        }
        let base_sfen = match sfen {
            "startpos" => self.start_sfen.clone(),
            sfen => sfen.to_string(),
        };
        self.send("force")?;
        self.send(&format!("setboard {}", to_xboard_position(&base_sfen)))?;
        for mv in moves {
            let command = move_command(mv, self.capabilities.usermove)?;
            self.send(&command)?;
        }
        self.board_dirty = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.send("stop")
    }

    fn ponderhit(&mut self) -> Result<()> {
        self.send("ponderhit")?;
        log::info!("ponderhit");
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.send("quit")
    }

    fn kill(&mut self) -> Result<()> {
        self.channel.kill()
    }
}

/// `st` は秒単位。端数は切り捨て、最低 1 秒。
fn movetime_seconds(ms: u64) -> u64 {
    (ms / 1000).max(1)
}

/// `feature` の引数を `key=value` の列に分ける。値は `"..."` で空白を含められる。
fn parse_features(args: &str) -> Vec<(String, String)> {
    let mut features = Vec::new();
    let mut rest = args.trim_start();
    while !rest.is_empty() {
        let key_end = rest.find(|c: char| c == '=' || c.is_whitespace()).unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = &rest[key_end..];
        let Some(after_eq) = rest.strip_prefix('=') else {
            // '=' の無いトークンは読み飛ばす
            rest = rest.trim_start();
            continue;
        };
        let value;
        if let Some(quoted) = after_eq.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            value = &quoted[..end];
            rest = quoted.get(end + 1..).unwrap_or_default();
        } else {
            let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
            value = &after_eq[..end];
            rest = &after_eq[end..];
        }
        features.push((key.to_string(), value.to_string()));
        rest = rest.trim_start();
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedChannel, SentLog, SILENCE};
    use crate::types::{Color, SearchLimits, SFEN_MINISHOGI, SFEN_STANDARD};

    fn no_timeouts() -> ProtocolOptions {
        ProtocolOptions {
            handshake_timeout: None,
            ping_timeout: None,
            variant_reply_timeout: None,
        }
    }

    /// ハンドシェイク済みのクライアント。送信記録はクリアしてある。
    fn ready_client(features: &str, replies: &[&str]) -> (XBoardClient<ScriptedChannel>, SentLog) {
        let mut lines = vec![format!("feature {features} done=1")];
        lines.extend(replies.iter().map(|s| s.to_string()));
        let (channel, sent) = ScriptedChannel::new(lines);
        let client =
            XBoardClient::handshake(channel, TimeControl::new(5, 3, 0), ProtocolOptions::default())
                .unwrap();
        sent.clear();
        (client, sent)
    }

    fn request<'a>(moves: &'a [String], limits: SearchLimits) -> SearchRequest<'a> {
        SearchRequest {
            sfen: "startpos",
            moves,
            turn: if moves.len() % 2 == 0 { Color::Black } else { Color::White },
            limits,
        }
    }

    #[test]
    fn handshake_records_capabilities_only() {
        let (channel, sent) =
            ScriptedChannel::new(["feature setboard=1 usermove=1", "feature done=1"]);
        let client = XBoardClient::handshake(channel, TimeControl::new(1, 2, 3), no_timeouts())
            .unwrap();
        assert_eq!(
            client.capabilities(),
            Capabilities {
                setboard: true,
                usermove: true
            }
        );
        assert!(!client.is_force_mode());
        assert_eq!(client.start_sfen(), SFEN_STANDARD);
        assert_eq!(client.name(), None);
        assert_eq!(sent.lines(), vec!["xboard", "protover 2", "level 0 1 5", "new"]);
    }

    #[test]
    fn handshake_tolerates_noise_before_done() {
        let (channel, _) = ScriptedChannel::new([
            "# Sjaak II booting",
            "Error (unknown command): protover",
            "tellics say hello",
            "feature myname=\"Sjaak II 1.4\" setboard=1 done=0",
            "feature usermove=0",
            "feature done=1",
        ]);
        let client = XBoardClient::handshake(channel, TimeControl::default(), no_timeouts())
            .unwrap();
        assert_eq!(client.name(), Some("Sjaak II 1.4"));
        assert!(client.capabilities().setboard);
        assert!(!client.capabilities().usermove);
    }

    #[test]
    fn done_on_the_same_line_still_applies_features() {
        let (client, _) = ready_client("setboard=1 usermove=1", &[]);
        assert!(client.capabilities().setboard);
        assert!(client.capabilities().usermove);
    }

    #[test]
    fn handshake_fails_when_the_engine_goes_away() {
        let (channel, _) = ScriptedChannel::new(["feature setboard=1"]);
        let result = XBoardClient::handshake(channel, TimeControl::default(), no_timeouts());
        assert!(matches!(result, Err(EngineError::EndOfStream)));

        let (channel, _) = ScriptedChannel::new(["feature setboard=1"]);
        let result =
            XBoardClient::handshake(channel, TimeControl::default(), ProtocolOptions::default());
        assert!(matches!(result, Err(EngineError::Timeout(_))));
    }

    #[test]
    fn parse_features_handles_quotes_and_stray_tokens() {
        let features = parse_features("myname=\"Fairy Max 5\" stray sigint=0 done=1");
        assert_eq!(
            features,
            vec![
                ("myname".to_string(), "Fairy Max 5".to_string()),
                ("sigint".to_string(), "0".to_string()),
                ("done".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn set_option_renames_and_renders_values() {
        let (mut client, sent) = ready_client("", &[]);
        client.set_option("Hash", Some(&OptionValue::Int(256))).unwrap();
        client.set_option("Threads", Some(&OptionValue::Int(2))).unwrap();
        client.set_option("Ponder", Some(&OptionValue::Bool(true))).unwrap();
        client.set_option("Book", None).unwrap();
        assert_eq!(sent.lines(), vec!["memory 256", "cores 2", "ponder true", "book none"]);
    }

    #[test]
    fn variant_setup_reply_defines_start_position() {
        let setup = "setup (PNBRLSE..GKpnbrlse..gk) 9x9+7_shogi 8p/9/7K1 w 0 1";
        let (mut client, sent) = ready_client("", &[setup, setup]);
        client.set_variant_options(Variant::Standard).unwrap();
        let first = client.start_sfen().to_string();
        client.set_variant_options(Variant::Standard).unwrap();
        assert_eq!(first, "1k7/9/P8 b 0 1");
        assert_eq!(client.start_sfen(), first);
        assert!(client.is_force_mode());
        assert_eq!(sent.lines(), vec!["variant shogi", "variant shogi"]);
    }

    #[test]
    fn variant_without_setup_keeps_the_default() {
        let (mut client, _) = ready_client("", &[SILENCE]);
        client.set_variant_options(Variant::Minishogi).unwrap();
        assert_eq!(client.start_sfen(), SFEN_MINISHOGI);

        let (mut client, _) = ready_client("", &["pong 1"]);
        client.set_variant_options(Variant::Minishogi).unwrap();
        assert_eq!(client.start_sfen(), SFEN_MINISHOGI);
    }

    #[test]
    fn variant_reads_past_informational_lines() {
        let (mut client, _) = ready_client(
            "",
            &["# loading chu", "Error: no book", "setup (PLN) 12x12+0_chu 8p/9/7K1 w - 1"],
        );
        client.set_variant_options(Variant::Chushogi).unwrap();
        assert_eq!(client.start_sfen(), "1k7/9/P8 b - 1");
    }

    #[test]
    fn ping_skips_other_lines_until_pong() {
        let (mut client, sent) = ready_client("", &["# thinking", "pong 1"]);
        client.ping().unwrap();
        assert_eq!(sent.lines(), vec!["ping 1"]);

        let (mut client, _) = ready_client("", &["# nothing"]);
        assert!(matches!(client.ping(), Err(EngineError::Timeout(_))));
    }

    #[test]
    fn first_search_forces_setboard_and_go() {
        let (mut client, sent) = ready_client("setboard=1 usermove=1", &[SILENCE, "move g7g6"]);
        client.set_variant_options(Variant::Standard).unwrap();
        sent.clear();

        let limits = SearchLimits {
            movetime: Some(1000),
            ..Default::default()
        };
        let result = client.go(&request(&[], limits)).unwrap();
        assert_eq!(result.best_move.as_deref(), Some("7g7f"));
        assert_eq!(result.ponder_move, None);
        assert_eq!(
            sent.lines(),
            vec![
                "easy".to_string(),
                "force".to_string(),
                "st 1".to_string(),
                format!("setboard {SFEN_STANDARD}"),
                "go".to_string(),
                "level 0 5 3".to_string(),
            ]
        );
        assert!(!client.is_force_mode());
    }

    #[test]
    fn later_searches_send_only_the_last_move() {
        let (mut client, sent) =
            ready_client("usermove=1", &[SILENCE, "move c3c4", "move b2h8+ ponder e1d2"]);
        client.set_variant_options(Variant::Standard).unwrap();
        let moves: Vec<String> = vec!["7g7f".to_string()];
        let first = client.go(&request(&moves, SearchLimits::default())).unwrap();
        assert_eq!(first.best_move.as_deref(), Some("3c3d"));
        sent.clear();

        let moves: Vec<String> = ["7g7f", "3c3d", "2g2f"].iter().map(|s| s.to_string()).collect();
        let limits = SearchLimits {
            btime: Some(60_000),
            wtime: Some(45_000),
            ..Default::default()
        };
        let second = client.go(&request(&moves, limits)).unwrap();
        assert_eq!(second.best_move.as_deref(), Some("2b8h+"));
        assert_eq!(second.ponder_move.as_deref(), Some("5a4b"));
        // 後手番: time は後手、otim は先手の残り
        assert_eq!(sent.lines(), vec!["time 4500", "otim 6000", "usermove b7b6"]);
    }

    #[test]
    fn force_mode_replays_all_moves_without_setboard() {
        let (mut client, sent) = ready_client("", &[SILENCE, "move @@@@"]);
        client.set_variant_options(Variant::Standard).unwrap();
        sent.clear();
        let moves: Vec<String> = vec!["7g7f".to_string(), "3c3d".to_string()];
        let limits = SearchLimits {
            depth: Some(8),
            ponder: true,
            ..Default::default()
        };
        let result = client.go(&request(&moves, limits)).unwrap();
        assert_eq!(result, BestMoveResult::default());
        assert_eq!(sent.lines(), vec!["hard", "force", "sd 8", "g7g6", "c3c4", "go"]);
    }

    #[test]
    fn info_lines_accumulate_until_the_move() {
        let (mut client, _) = ready_client(
            "",
            &[
                SILENCE,
                "info depth 4 nodes 900 score cp 30 pv g7g6",
                "# searching",
                "Error: hash too small",
                "telluser hi",
                "info depth 5 score cp 12 upperbound",
                "move g7g6",
            ],
        );
        client.set_variant_options(Variant::Standard).unwrap();
        client.go(&request(&[], SearchLimits::default())).unwrap();
        let info = client.info();
        assert_eq!(info.depth, Some(5));
        assert_eq!(info.nodes, Some(900));
        assert_eq!(info.score.map(|s| s.value), Some(30));
        assert_eq!(info.pv.as_deref(), Some("g7g6"));
    }

    #[test]
    fn stream_closure_during_search_is_an_error() {
        let (mut client, _) = ready_client("", &[SILENCE, "info depth 3"]);
        client.set_variant_options(Variant::Standard).unwrap();
        let result = client.go(&request(&[], SearchLimits::default()));
        assert!(matches!(result, Err(EngineError::EndOfStream)));
    }

    #[test]
    fn undecodable_move_reply_is_reported() {
        let (mut client, _) = ready_client("", &[SILENCE, "move zz99"]);
        client.set_variant_options(Variant::Standard).unwrap();
        let result = client.go(&request(&[], SearchLimits::default()));
        assert!(matches!(result, Err(EngineError::MalformedMove(mv)) if mv == "zz99"));
    }

    #[test]
    fn movetime_rounds_down_to_whole_seconds() {
        assert_eq!(movetime_seconds(1000), 1);
        assert_eq!(movetime_seconds(1500), 1);
        assert_eq!(movetime_seconds(2500), 2);
        assert_eq!(movetime_seconds(300), 1);
        assert_eq!(movetime_seconds(0), 1);
    }

    #[test]
    fn fractional_movetime_never_exceeds_the_budget() {
        let (mut client, sent) = ready_client("", &[SILENCE, "move g7g6"]);
        client.set_variant_options(Variant::Standard).unwrap();
        sent.clear();
        let limits = SearchLimits {
            movetime: Some(2500),
            ..Default::default()
        };
        client.go(&request(&[], limits)).unwrap();
        assert_eq!(sent.lines(), vec!["easy", "force", "st 2", "go", "level 0 5 3"]);
    }

    #[test]
    fn new_game_after_a_search_starts_with_new() {
        let (mut client, sent) = ready_client("", &[SILENCE, "move c3c4", SILENCE, "move g7g6"]);
        client.set_variant_options(Variant::Standard).unwrap();
        let moves: Vec<String> = vec!["2g2f".to_string(), "8c8d".to_string()];
        client.go(&request(&moves, SearchLimits::default())).unwrap();
        sent.clear();

        client.set_variant_options(Variant::Standard).unwrap();
        client.go(&request(&[], SearchLimits::default())).unwrap();
        assert_eq!(
            sent.lines(),
            vec!["new", "level 0 5 3", "variant shogi", "easy", "force", "go"]
        );
    }

    #[test]
    fn game_result_is_sent_with_setboard_only() {
        let (mut client, sent) = ready_client("setboard=1 usermove=1", &[]);
        let moves: Vec<String> = vec!["7g7f".to_string(), "3c3d".to_string()];
        client.report_game_result("startpos", &moves).unwrap();
        assert_eq!(
            sent.lines(),
            vec![
                "force".to_string(),
                format!("setboard {SFEN_STANDARD}"),
                "usermove g7g6".to_string(),
                "usermove c3c4".to_string(),
            ]
        );

        let (mut client, sent) = ready_client("", &[]);
        client.report_game_result("startpos", &moves).unwrap();
        assert!(sent.lines().is_empty());
    }

    #[test]
    fn control_commands_are_single_lines() {
        let (mut client, sent) = ready_client("", &[]);
        client.stop().unwrap();
        client.ponderhit().unwrap();
        client.quit().unwrap();
        assert_eq!(sent.lines(), vec!["stop", "ponderhit", "quit"]);
    }
}
