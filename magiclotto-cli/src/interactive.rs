use std::io::{self, Write};

use anyhow::{bail, Context, Result};

use magiclotto_data::cache::HistoryCache;
use magiclotto_data::config::FetchConfig;
use magiclotto_data::fetch::HttpDrawSource;
use magiclotto_data::models::{Combination, HistoryLog};
use magiclotto_engine::frequency::{HOT_COUNT, HOT_WINDOW};
use magiclotto_engine::recommend::Method;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Recommend,
    Score,
    Stats,
    Recent,
    Refresh,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "recommend" | "rec" => Some(InteractiveCommand::Recommend),
        "2" | "score" => Some(InteractiveCommand::Score),
        "3" | "stats" | "hot" => Some(InteractiveCommand::Stats),
        "4" | "recent" | "history" | "hist" => Some(InteractiveCommand::Recent),
        "5" | "refresh" => Some(InteractiveCommand::Refresh),
        "6" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Interactive mode ──");
    println!("  1. recommend  Get a recommended combination");
    println!("  2. score      Check a combination against past draws");
    println!("  3. stats      Numbers to watch this week");
    println!("  4. recent     Latest winning numbers");
    println!("  5. refresh    Download the history again");
    println!("  6. quit       Exit");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    if read == 0 {
        bail!("End of input");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Accepts numbers separated by commas and/or spaces.
fn parse_numbers(input: &str) -> Result<Vec<u8>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>().with_context(|| format!("'{}' is not a number", s)))
        .collect()
}

fn prompt_combination() -> Result<Combination> {
    loop {
        let input = prompt("6 numbers, comma separated (e.g. 3,11,25,33,40,44) : ")?;
        match parse_numbers(&input) {
            Ok(v) => match Combination::new(&v) {
                Ok(combination) => return Ok(combination),
                Err(e) => println!("{e}. Try again."),
            },
            Err(e) => println!("{e}. Try again."),
        }
    }
}

fn prompt_method() -> Result<Method> {
    let names: Vec<&str> = Method::ALL.iter().map(Method::name).collect();
    loop {
        let input = prompt_with_default(&format!("Method ({})", names.join("/")), "frequency")?;
        match input.parse::<Method>() {
            Ok(method) => return Ok(method),
            Err(e) => println!("{e}. Try again."),
        }
    }
}

fn cmd_recommend_interactive(history: &HistoryLog) -> Result<()> {
    let method = prompt_method()?;
    let manual = if method == Method::Manual {
        Some(prompt_combination()?)
    } else {
        None
    };
    super::cmd_recommend(history, method, manual.as_ref(), 1, None, false)
}

fn cmd_score_interactive(history: &HistoryLog) -> Result<()> {
    let combination = prompt_combination()?;
    super::cmd_score(history, &combination)
}

fn cmd_stats_interactive(history: &HistoryLog) -> Result<()> {
    let window = prompt_with_default("Recent draws to analyse", &HOT_WINDOW.to_string())?;
    let window: usize = window.parse().context("Invalid number")?;
    super::cmd_stats(history, window, HOT_COUNT)
}

pub fn run_interactive(source: &HttpDrawSource, config: &FetchConfig) -> Result<()> {
    println!("Welcome to magiclotto interactive mode!");

    let mut cache = HistoryCache::new(config.cache_ttl());

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let command = match parse_command(&input) {
            Some(command) => command,
            None => {
                println!("Unknown command: '{}'. Type a number (1-6) or a command name.", input);
                continue;
            }
        };

        if command == InteractiveCommand::Quit {
            println!("Good luck!");
            break;
        }
        if command == InteractiveCommand::Refresh {
            cache.invalidate();
        }

        let history = cache.get_or_fetch(|| super::load_history(source, config));

        let result = match command {
            InteractiveCommand::Recommend => cmd_recommend_interactive(history),
            InteractiveCommand::Score => cmd_score_interactive(history),
            InteractiveCommand::Stats => cmd_stats_interactive(history),
            InteractiveCommand::Recent | InteractiveCommand::Refresh => super::cmd_history(history, 5),
            InteractiveCommand::Quit => Ok(()),
        };
        if let Err(e) = result {
            println!("Error: {e:#}");
        }
    }

    Ok(())
}
