//! engine_bridge: 設定ファイルのエンジンを起動し、指定局面を1回探索する

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rshogi_engine_bridge::{
    create_engine, create_engine_with_backoff, BackoffPolicy, BestMoveResult, Config,
    EngineRegistry, GameState, InfoTag, SearchInfo, SearchLimits, SearchRequest, TimeControl,
    Variant,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one search on a USI or XBoard engine", long_about = None)]
struct Args {
    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Variant name (standard, minishogi, chushogi)
    #[arg(long, default_value = "standard")]
    variant: String,

    /// Base position as SFEN, or `startpos`
    #[arg(long, default_value = "startpos")]
    sfen: String,

    /// Moves played from the base position
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// Fixed time per move in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    #[arg(long)]
    depth: Option<u32>,

    #[arg(long)]
    nodes: Option<u64>,

    /// Remaining clocks and increments in milliseconds
    #[arg(long)]
    btime: Option<u64>,
    #[arg(long)]
    wtime: Option<u64>,
    #[arg(long)]
    binc: Option<u64>,
    #[arg(long)]
    winc: Option<u64>,
    #[arg(long)]
    byoyomi: Option<u64>,

    /// Time control announced to XBoard engines: base minutes
    #[arg(long, default_value_t = 0)]
    base: u64,
    /// Time control announced to XBoard engines: increment seconds
    #[arg(long, default_value_t = 0)]
    inc: u64,
    /// Time control announced to XBoard engines: byoyomi seconds
    #[arg(long, default_value_t = 0)]
    byo: u64,

    #[arg(long)]
    ponder: bool,

    /// Info tags to report (comma separated); defaults to score,depth,nodes,nps
    #[arg(long, value_delimiter = ',')]
    stats: Vec<String>,

    /// Print the result as one JSON object
    #[arg(long)]
    json: bool,

    /// Fail on the first startup error instead of retrying with backoff
    #[arg(long)]
    no_retry: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Serialize)]
struct SearchRecord<'a> {
    engine: Option<&'a str>,
    #[serde(flatten)]
    result: &'a BestMoveResult,
    stats: Vec<String>,
    info: &'a SearchInfo,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load(&args.config)?;
    let tags = stat_tags(&args.stats)?;
    let variant = Variant::from_name(&args.variant);
    let time_control = TimeControl::new(args.base, args.inc, args.byo);
    let registry = EngineRegistry::new();

    let mut engine = if args.no_retry {
        create_engine(&config.engine, variant, time_control, &registry)
    } else {
        create_engine_with_backoff(
            &config.engine,
            variant,
            time_control,
            &registry,
            BackoffPolicy::default(),
        )
    }
    .context("failed to start engine")?;

    let go_commands = engine.go_commands();
    let limits = SearchLimits {
        movetime: args.movetime.or(go_commands.movetime),
        depth: args.depth.or(go_commands.depth),
        nodes: args.nodes.or(go_commands.nodes),
        btime: args.btime,
        wtime: args.wtime,
        binc: args.binc,
        winc: args.winc,
        byoyomi: args.byoyomi,
        ponder: args.ponder,
    };
    let game = GameState {
        variant,
        initial_sfen: args.sfen.clone(),
        moves: args.moves.clone(),
    };
    let request = SearchRequest {
        sfen: &game.initial_sfen,
        moves: &game.moves,
        turn: game.turn(),
        limits,
    };
    let result = engine.search(variant, &request).context("search failed")?;
    let stats = engine.stats(&tags);

    if args.json {
        let record = SearchRecord {
            engine: engine.name(),
            result: &result,
            stats,
            info: engine.info(),
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        let mut line = format!("bestmove {}", result.best_move.as_deref().unwrap_or("resign"));
        if let Some(ponder) = &result.ponder_move {
            line.push_str(&format!(" ponder {ponder}"));
        }
        println!("{line}");
        for stat in stats {
            println!("{stat}");
        }
    }

    if let Err(e) = engine.quit() {
        log::warn!("Failed to send quit: {e}");
    }
    Ok(())
}

fn stat_tags(names: &[String]) -> Result<Vec<InfoTag>> {
    if names.is_empty() {
        return Ok(InfoTag::DEFAULT_STATS.to_vec());
    }
    names
        .iter()
        .map(|name| {
            InfoTag::from_keyword(name.trim())
                .with_context(|| format!("unknown info tag: {name}"))
        })
        .collect()
}
