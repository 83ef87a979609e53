mod config;
mod display;
mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use magiclotto_data::config::FetchConfig;
use magiclotto_data::fetch::{fetch_all_history, fetch_latest_round, HttpDrawSource};
use magiclotto_data::models::{Combination, HistoryLog};
use magiclotto_engine::frequency::{hot_numbers, number_stats, recent_draws, HOT_COUNT, HOT_WINDOW};
use magiclotto_engine::recommend::{generate, ExclusionSet, Method};
use magiclotto_engine::scoring::score_against_history;

use crate::config::FetchArgs;

#[derive(Parser)]
#[command(name = "magiclotto", version, about = "Lotto 6/45 history statistics and number recommendations")]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend combinations
    Recommend {
        /// Recommendation method
        #[arg(short, long, value_enum, default_value = "frequency")]
        method: Method,

        /// Six comma-separated numbers for the manual method (e.g. 3,11,25,33,40,44)
        #[arg(short, long, value_delimiter = ',')]
        numbers: Vec<u8>,

        /// Number of combinations to generate
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed for reproducible picks
        #[arg(long)]
        seed: Option<u64>,

        /// Allow combinations that already won in the past
        #[arg(long)]
        no_exclude: bool,
    },

    /// Score a combination against every past draw
    Score {
        /// Six numbers
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Most frequent numbers and full frequency table
    Stats {
        /// Number of recent draws to analyse
        #[arg(short, long, default_value_t = HOT_WINDOW)]
        window: usize,

        /// How many hot numbers to highlight
        #[arg(short, long, default_value_t = HOT_COUNT)]
        top: usize,
    },

    /// Show the most recent draws
    History {
        #[arg(short, long, default_value = "5")]
        last: usize,
    },

    /// Print the latest available round
    Latest,

    /// Interactive mode (REPL)
    Interactive,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config: FetchConfig = cli.fetch.into();
    let source = HttpDrawSource::new(&config)?;

    match cli.command {
        Command::Recommend {
            method,
            numbers,
            count,
            seed,
            no_exclude,
        } => {
            let manual = manual_combination(method, &numbers)?;
            let history = load_history(&source, &config);
            cmd_recommend(&history, method, manual.as_ref(), count, seed, no_exclude)
        }
        Command::Score { numbers } => {
            let combination = Combination::new(&numbers)?;
            let history = load_history(&source, &config);
            cmd_score(&history, &combination)
        }
        Command::Stats { window, top } => {
            let history = load_history(&source, &config);
            cmd_stats(&history, window, top)
        }
        Command::History { last } => {
            let history = load_history(&source, &config);
            cmd_history(&history, last)
        }
        Command::Latest => {
            let latest = fetch_latest_round(&source, config.baseline_round);
            println!("{latest}");
            Ok(())
        }
        Command::Interactive => interactive::run_interactive(&source, &config),
    }
}

/// Downloads the full history with a progress bar on stderr.
pub(crate) fn load_history(source: &HttpDrawSource, config: &FetchConfig) -> HistoryLog {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Downloading draw history");

    let history = fetch_all_history(source, config.baseline_round, |round, total| {
        if pb.length() != Some(total as u64) {
            pb.set_length(total as u64);
        }
        pb.set_position(round as u64);
    });

    pb.finish_with_message(format!("{} draws loaded", history.len()));
    history
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Validates the manual numbers up front, before any network traffic.
pub(crate) fn manual_combination(method: Method, numbers: &[u8]) -> Result<Option<Combination>> {
    if method != Method::Manual {
        return Ok(None);
    }
    let combination = Combination::new(numbers).context("Invalid manual combination")?;
    Ok(Some(combination))
}

pub(crate) fn cmd_recommend(
    history: &HistoryLog,
    method: Method,
    manual: Option<&Combination>,
    count: usize,
    seed: Option<u64>,
    no_exclude: bool,
) -> Result<()> {
    let exclude = if no_exclude {
        ExclusionSet::new()
    } else {
        ExclusionSet::from_history(history.records())
    };
    let mut rng = make_rng(seed);

    if history.is_empty() {
        println!("(No draw history available, statistics-based methods fall back to random picks)");
    }

    let count = if method == Method::Manual { 1 } else { count.max(1) };
    for i in 1..=count {
        let rec = generate(method, history.records(), &exclude, manual, &mut rng)?;
        info!(method = %rec.method, attempts = rec.attempts, "recommendation generated");
        let tally = score_against_history(&rec.combination, history.records());
        display::display_recommendation(i, &rec, &tally);
    }

    let hot = hot_numbers(history.records(), HOT_WINDOW, HOT_COUNT);
    display::display_hot_numbers(&hot, history.len().min(HOT_WINDOW));
    Ok(())
}

pub(crate) fn cmd_score(history: &HistoryLog, combination: &Combination) -> Result<()> {
    println!("\n🎯 {} against {} past draws\n", combination, history.len());
    let tally = score_against_history(combination, history.records());
    display::display_tally(&tally);
    Ok(())
}

pub(crate) fn cmd_stats(history: &HistoryLog, window: usize, top: usize) -> Result<()> {
    let recent = history.last_n(window);
    let hot = hot_numbers(recent, window, top);
    display::display_hot_numbers(&hot, recent.len());
    display::display_stats(&number_stats(recent), recent.len());
    Ok(())
}

pub(crate) fn cmd_history(history: &HistoryLog, last: usize) -> Result<()> {
    display::display_draws(&recent_draws(history.records(), last));
    Ok(())
}
