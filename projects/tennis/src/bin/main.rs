use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::serve;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use utils_trace::TraceFormat;

use projects_tennis::config::{AppConfig, ConfigError};
use projects_tennis::endpoints::dashboard::router::{router, DashboardState};
use projects_tennis::pipelines::categories::index::{
    fetch_category_table, filter_above, join_by_name, FetchCategoryError, StatCategory, DEFAULT_CATEGORY_YEAR,
};
use projects_tennis::pipelines::merge::index::{
    merge_player_stats, MergeOptions, DEFAULT_MIN_YEAR, OUTPUT_FILE as MERGE_OUTPUT_FILE, STATS2_RAW_FILE,
    STATS_RAW_FILE,
};
use projects_tennis::pipelines::odds::index::{run_odds_pipeline, OddsPipelineOptions, DEFAULT_OUTPUT_FILE};
use projects_tennis::pipelines::player_history::index::CollectionOptions;
use projects_tennis::pipelines::serve_stats::index::{
    get_all_player_stats, load_serve_players, LoadServeStatsError,
};
use projects_tennis::pipelines::top_players::index::{
    collect_top_players, CollectTopPlayersError, DEFAULT_TOP_LIMIT, OUTPUT_FILE as TOP_PLAYERS_OUTPUT_FILE,
};
use projects_tennis::pipelines::tournament_players::index::{
    collect_tournament_players, CollectTournamentPlayersError, DEFAULT_TOURNAMENT_ID,
    OUTPUT_FILE as TOURNAMENT_OUTPUT_FILE,
};
use projects_tennis::sources::rapidapi::{RapidApiAtp, RapidApiOdds, RapidApiStats};
use projects_tennis::storage::json_file::{read_json, write_pretty_json, JsonFileError};
use projects_tennis::storage::stats_csv::{StatsCsv, StatsCsvError};
use projects_tennis::utils::leaderboard::{build_leaderboard, render_table, ServeStat, DEFAULT_LEADERBOARD_SIZE};
use projects_tennis::utils::prompt::{AutoConfirm, Confirm, TerminalConfirm};

const STATS_CSV_FILE: &str = "stats.csv";
const DEFAULT_STATS_YEAR: &str = "2024";

#[derive(Debug, Error)]
pub enum MainError {
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("Config: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
    #[error("JsonFile: {source}")]
    JsonFile {
        #[from]
        source: JsonFileError,
    },
    #[error("StatsCsv: {source}")]
    StatsCsv {
        #[from]
        source: StatsCsvError,
    },
    #[error("LoadServeStats: {source}")]
    LoadServeStats {
        #[from]
        source: LoadServeStatsError,
    },
    #[error("CollectTopPlayers: {source}")]
    CollectTopPlayers {
        #[from]
        source: CollectTopPlayersError,
    },
    #[error("CollectTournamentPlayers: {source}")]
    CollectTournamentPlayers {
        #[from]
        source: CollectTournamentPlayersError,
    },
    #[error("FetchCategory: {source}")]
    FetchCategory {
        #[from]
        source: FetchCategoryError,
    },
    #[error("InvalidInput: {message}")]
    InvalidInput {
        message: String,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Tennis odds and player statistics collector.
#[derive(Debug, Parser)]
#[command(name = "projects_tennis", version)]
struct Cli {
    /// Default log level when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// `compact` or `pretty`.
    #[arg(long, global = true, default_value = "compact")]
    log_format: TraceFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect pre-game ATP singles odds enriched with serve statistics.
    CollectOdds(CollectOddsArgs),
    /// Fetch the season's serve statistics and print how many players were mapped.
    ServeStats(ServeStatsArgs),
    /// Append the season's serve statistics to stats.csv.
    ExportStats(ExportStatsArgs),
    /// Collect surface summaries and match history for the top ranked players.
    CollectTopPlayers(CollectTopPlayersArgs),
    /// Collect surface summaries and match history for a tournament's players.
    CollectTournamentPlayers(CollectTournamentPlayersArgs),
    /// Merge surface records and player histories into stats_clean.json.
    Merge(MergeArgs),
    /// Print serve leaderboards.
    Leaderboard(LeaderboardArgs),
    /// Print category tables filtered by their thresholds.
    Categories(CategoriesArgs),
    /// Serve the leaderboard dashboard.
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
struct CollectOddsArgs {
    #[arg(long, default_value = DEFAULT_STATS_YEAR)]
    year: String,
    #[arg(long, default_value = "bet365")]
    bookmaker: String,
    #[arg(long, default_value_t = 5)]
    batch_size: usize,
    #[arg(long, default_value_t = 1000)]
    events_delay_ms: u64,
    #[arg(long, default_value_t = 500)]
    odds_delay_ms: u64,
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    /// Answer yes to every prompt.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct ServeStatsArgs {
    #[arg(long, default_value = DEFAULT_STATS_YEAR)]
    year: String,
    /// Also write the name-keyed map as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExportStatsArgs {
    #[arg(long, default_value = DEFAULT_STATS_YEAR)]
    year: String,
    /// Defaults to `<data dir>/clean/stats.csv`.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CollectTopPlayersArgs {
    #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
    limit: usize,
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
    /// Defaults to `<data dir>/raw/stats2_raw.json`.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CollectTournamentPlayersArgs {
    #[arg(long, default_value = DEFAULT_TOURNAMENT_ID)]
    tournament_id: String,
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
    /// Defaults to `<data dir>/clean/stats.csv`.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Defaults to `<data dir>/raw/stats3_raw.json`.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MergeArgs {
    #[arg(long, default_value_t = DEFAULT_MIN_YEAR)]
    min_year: i64,
    /// Defaults to `<data dir>/clean/stats_clean.json`.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct LeaderboardArgs {
    /// Statistic slug; every statistic when omitted.
    #[arg(long)]
    stat: Option<ServeStat>,
    #[arg(long, default_value = DEFAULT_STATS_YEAR)]
    year: String,
    #[arg(long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
    limit: usize,
}

#[derive(Debug, Args)]
struct CategoriesArgs {
    /// Category slug, repeatable; every category when omitted.
    #[arg(long = "category")]
    categories: Vec<StatCategory>,
    #[arg(long, default_value = DEFAULT_CATEGORY_YEAR)]
    year: String,
    /// Threshold override as `<slug>=<value>`, repeatable.
    #[arg(long = "threshold", value_parser = parse_threshold)]
    thresholds: Vec<(StatCategory, f64)>,
    /// Also print players above the threshold in every selected category.
    #[arg(long)]
    join: bool,
}

#[derive(Debug, Args)]
struct DashboardArgs {
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,
    #[arg(long, default_value = DEFAULT_STATS_YEAR)]
    year: String,
    #[arg(long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
    limit: usize,
}

fn parse_threshold(raw: &str) -> Result<(StatCategory, f64), String> {
    let (slug, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <category>=<value>, got '{raw}'"))?;
    let category = slug.parse::<StatCategory>().map_err(|err| err.to_string())?;
    let value = value.trim().parse::<f64>().map_err(|err| format!("{value}: {err}"))?;
    Ok((category, value))
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    utils_trace::init(&cli.log_level, cli.log_format).map_err(|source| MainError::TracingInit { source })?;

    let config = AppConfig::from_env();

    match cli.command {
        Command::CollectOdds(args) => collect_odds(&config, args).await,
        Command::ServeStats(args) => serve_stats(&config, args).await,
        Command::ExportStats(args) => export_stats(&config, args).await,
        Command::CollectTopPlayers(args) => top_players(&config, args).await,
        Command::CollectTournamentPlayers(args) => tournament_players(&config, args).await,
        Command::Merge(args) => merge(&config, args),
        Command::Leaderboard(args) => leaderboard(&config, args).await,
        Command::Categories(args) => categories(&config, args).await,
        Command::Dashboard(args) => dashboard(&config, args).await,
    }
}

async fn collect_odds(config: &AppConfig, args: CollectOddsArgs) -> Result<(), MainError> {
    let odds = RapidApiOdds::new(config.odds_client()?);
    let stats = RapidApiStats::new(config.stats_client()?);

    let options = OddsPipelineOptions {
        stats_year: args.year,
        bookmaker: args.bookmaker,
        batch_size: args.batch_size,
        events_delay: Duration::from_millis(args.events_delay_ms),
        odds_delay: Duration::from_millis(args.odds_delay_ms),
        ..Default::default()
    };

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm::stdio())
    };

    let report = run_odds_pipeline(&odds, &stats, confirm.as_mut(), &options).await;

    if report.events.is_empty() {
        warn!("No pre-game event collected");
    } else {
        write_pretty_json(&args.output, &report.events)?;
        info!("{} events written to {}", report.events.len(), args.output.display());
    }
    info!("Total API requests: {}", report.request_count);
    Ok(())
}

async fn serve_stats(config: &AppConfig, args: ServeStatsArgs) -> Result<(), MainError> {
    let stats = RapidApiStats::new(config.stats_client()?);
    let (players, request_count) = get_all_player_stats(&stats, &args.year).await;

    info!("{} players mapped with {request_count} API requests", players.len());
    if let Some(output) = args.output {
        write_pretty_json(&output, &players)?;
        info!("Serve statistics written to {}", output.display());
    }
    Ok(())
}

async fn export_stats(config: &AppConfig, args: ExportStatsArgs) -> Result<(), MainError> {
    let stats = RapidApiStats::new(config.stats_client()?);
    let players = load_serve_players(&stats, &args.year).await?;

    let csv = StatsCsv::new(args.csv.unwrap_or_else(|| config.clean_path(STATS_CSV_FILE)));
    let summary = csv.export_serve_stats(&players)?;

    info!(
        "{}: {} rows appended, {} already present, {} incomplete",
        csv.path().display(),
        summary.appended,
        summary.skipped_duplicates,
        summary.skipped_incomplete
    );
    Ok(())
}

async fn top_players(config: &AppConfig, args: CollectTopPlayersArgs) -> Result<(), MainError> {
    let atp = RapidApiAtp::new(config.atp_client()?);
    let options = CollectionOptions {
        player_delay: Duration::from_millis(args.delay_ms),
        ..Default::default()
    };

    let outcome = collect_top_players(&atp, args.limit, &options).await?;

    if outcome.records.is_empty() {
        warn!("No player data collected");
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| config.raw_path(TOP_PLAYERS_OUTPUT_FILE));
    write_pretty_json(&output, &outcome.records)?;
    info!(
        "{} written: {} processed, {} succeeded, {} failed, {} players stored",
        output.display(),
        outcome.processed,
        outcome.succeeded,
        outcome.failed(),
        outcome.records.len()
    );
    Ok(())
}

async fn tournament_players(config: &AppConfig, args: CollectTournamentPlayersArgs) -> Result<(), MainError> {
    let atp = RapidApiAtp::new(config.atp_client()?);
    let csv = StatsCsv::new(args.csv.unwrap_or_else(|| config.clean_path(STATS_CSV_FILE)));

    let known_names = match csv.player_names() {
        Ok(names) => names,
        Err(err) => {
            warn!("Could not read {}, keeping every tournament player: {err}", csv.path().display());
            None
        }
    };

    let options = CollectionOptions {
        player_delay: Duration::from_millis(args.delay_ms),
        ..Default::default()
    };

    let run = collect_tournament_players(&atp, &args.tournament_id, known_names.as_ref(), &options).await?;

    if run.collection.players.is_empty() {
        warn!("No player data collected");
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| config.raw_path(TOURNAMENT_OUTPUT_FILE));
    write_pretty_json(&output, &run.collection)?;
    info!(
        "{} written for tournament {}: {} in tournament, {} filtered, {} processed, {} succeeded",
        output.display(),
        args.tournament_id,
        run.collection.tournament_info.total_players_in_tournament,
        run.collection.tournament_info.filtered_players_count,
        run.processed,
        run.succeeded
    );
    Ok(())
}

fn merge(config: &AppConfig, args: MergeArgs) -> Result<(), MainError> {
    let stats_raw: Map<String, Value> = read_json(&config.raw_path(STATS_RAW_FILE))?;
    let stats2_raw: Map<String, Value> = read_json(&config.raw_path(STATS2_RAW_FILE))?;
    let id_to_name = StatsCsv::new(config.clean_path(STATS_CSV_FILE)).id_to_name()?;

    let clean = merge_player_stats(&stats_raw, &stats2_raw, &id_to_name, &MergeOptions { min_year: args.min_year });

    let output = args.output.unwrap_or_else(|| config.clean_path(MERGE_OUTPUT_FILE));
    write_pretty_json(&output, &clean)?;
    info!("{} players written to {}", clean.len(), output.display());
    Ok(())
}

async fn leaderboard(config: &AppConfig, args: LeaderboardArgs) -> Result<(), MainError> {
    let stats = RapidApiStats::new(config.stats_client()?);
    let players = load_serve_players(&stats, &args.year).await?;

    let selected: Vec<ServeStat> = match args.stat {
        Some(stat) => vec![stat],
        None => ServeStat::ALL.to_vec(),
    };

    for stat in selected {
        let board = build_leaderboard(&players, stat, args.limit);
        println!("{}", render_table(&board));
    }
    Ok(())
}

async fn categories(config: &AppConfig, args: CategoriesArgs) -> Result<(), MainError> {
    let stats = RapidApiStats::new(config.stats_client()?);

    let selected = if args.categories.is_empty() {
        StatCategory::ALL.to_vec()
    } else {
        args.categories
    };

    let mut filtered = Vec::with_capacity(selected.len());
    for category in selected {
        let threshold = args
            .thresholds
            .iter()
            .rev()
            .find(|(c, _)| *c == category)
            .map_or_else(|| category.default_threshold(), |(_, value)| *value);

        let table = fetch_category_table(&stats, category, &args.year).await?;
        let table = filter_above(&table, threshold);

        println!("{} ({} > {threshold})", category.slug(), category.value_column());
        for row in &table.rows {
            println!("  {:<30} {:>10.2}", row.name, row.value);
        }
        println!();
        filtered.push(table);
    }

    if args.join {
        if filtered.len() < 2 {
            return Err(MainError::InvalidInput {
                message: "--join needs at least two categories".to_string(),
            });
        }
        let header: Vec<&str> = filtered.iter().map(|t| t.category.slug()).collect();
        println!("Players above every threshold ({})", header.join(", "));
        for row in join_by_name(&filtered) {
            let values: Vec<String> = row.values.iter().map(|v| format!("{v:.2}")).collect();
            println!("  {:<30} {}", row.name, values.join("  "));
        }
    }
    Ok(())
}

async fn dashboard(config: &AppConfig, args: DashboardArgs) -> Result<(), MainError> {
    let stats = RapidApiStats::new(config.stats_client()?);

    let mut state = DashboardState::new(Arc::new(stats), args.year);
    state.limit = args.limit;

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Dashboard running on addr: {}", args.addr);

    serve(listener, router(state))
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
