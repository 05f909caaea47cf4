//! Cadence CLI
//!
//! Command-line front end for the scheduling engine. Card snapshots are read
//! as JSON from files (or `-` for stdin); results go to stdout, logs to stderr.

mod config;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_core::{
    Card, DefaultSessionPolicy, FSRSScheduler, FSRSState, Rating, ReviewResult, SessionPolicy,
    SessionRequest, format_interval, sort_by_priority,
};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Cadence - spaced repetition scheduler CLI
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Cadence spaced repetition scheduler")]
#[command(long_about = "Cadence schedules flashcard reviews with the FSRS-4.5 memory model.\n\nCard snapshots are JSON files; pass '-' to read from stdin.")]
struct Cli {
    /// Parameter file (overrides the config directory)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one rating to a card snapshot
    Schedule {
        /// Card snapshot JSON (omit for a new card)
        #[arg(long)]
        card: Option<PathBuf>,
        /// Rating: again, hard, good, easy or 1-4
        #[arg(long, short)]
        rating: Rating,
        /// Review time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Show the outcome of every rating without changing the card
    Preview {
        /// Card snapshot JSON (omit for a new card)
        #[arg(long)]
        card: Option<PathBuf>,
        /// Review time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Replay a rating sequence on a new card, reviewing each time it falls due
    Simulate {
        /// Comma-separated ratings, e.g. good,good,again
        #[arg(long, short, value_delimiter = ',', required = true)]
        ratings: Vec<Rating>,
        /// Time of the first review, RFC 3339 (defaults to now)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },

    /// Assemble a review session from a list of cards
    Queue {
        /// JSON array of cards
        #[arg(long)]
        cards: PathBuf,
        /// Session request JSON (deckId, newCardsLimit, reviewLimit)
        #[arg(long)]
        request: Option<PathBuf>,
        /// Restrict to one deck
        #[arg(long)]
        deck: Option<Uuid>,
        /// Maximum new cards
        #[arg(long)]
        new_limit: Option<usize>,
        /// Maximum due review cards
        #[arg(long)]
        review_limit: Option<usize>,
        /// Reorder the session by queue priority
        #[arg(long)]
        sort: bool,
        /// Session time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Show the resolved scheduling parameters
    Params,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let resolved = config::resolve(cli.params.as_deref())?;
    info!(source = %resolved.source, "Loaded parameters");
    let scheduler = FSRSScheduler::new(resolved.params.clone())?;

    match cli.command {
        Commands::Schedule { card, rating, now } => {
            run_schedule(&scheduler, card, rating, now_or(now), cli.json)
        }
        Commands::Preview { card, now } => run_preview(&scheduler, card, now_or(now), cli.json),
        Commands::Simulate { ratings, start } => {
            run_simulate(&scheduler, &ratings, now_or(start), cli.json)
        }
        Commands::Queue {
            cards,
            request,
            deck,
            new_limit,
            review_limit,
            sort,
            now,
        } => {
            let mut request = match request {
                Some(path) => read_json::<SessionRequest>(&path)?,
                None => SessionRequest::default(),
            };
            if let Some(deck) = deck {
                request = request.for_deck(deck);
            }
            if let Some(limit) = new_limit {
                request = request.with_new_cards_limit(limit);
            }
            if let Some(limit) = review_limit {
                request = request.with_review_limit(limit);
            }
            run_queue(&scheduler, &cards, &request, sort, now_or(now), cli.json)
        }
        Commands::Params => run_params(&resolved, cli.json),
    }
}

fn now_or(now: Option<DateTime<Utc>>) -> DateTime<Utc> {
    now.unwrap_or_else(Utc::now)
}

/// Read JSON from a file, or stdin for `-`
fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_card(path: Option<PathBuf>, now: DateTime<Utc>) -> anyhow::Result<FSRSState> {
    match path {
        Some(path) => read_json(&path),
        None => Ok(FSRSState::new(now)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run schedule command
fn run_schedule(
    scheduler: &FSRSScheduler,
    card: Option<PathBuf>,
    rating: Rating,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let card = load_card(card, now)?;
    let result = scheduler.schedule(&card, rating, now)?;

    if json {
        return print_json(&result);
    }

    println!("{}", "=== Cadence Schedule ===".cyan().bold());
    println!();
    print_result(&result);
    Ok(())
}

fn print_result(result: &ReviewResult) {
    let log = &result.log;
    let card = &result.card;

    println!("{}: {}", "Rating".white().bold(), log.rating);
    println!(
        "{}: {} -> {}",
        "State".white().bold(),
        log.state_before,
        card.state.to_string().green()
    );
    println!(
        "{}: {:.4} (was {:.4})",
        "Stability".white().bold(),
        card.stability,
        log.stability_before
    );
    println!(
        "{}: {:.4} (was {:.4})",
        "Difficulty".white().bold(),
        card.difficulty,
        log.difficulty_before
    );
    println!("{}: {}", "Elapsed Days".white().bold(), log.elapsed_days);
    println!(
        "{}: {} ({})",
        "Interval".white().bold(),
        card.scheduled_days,
        format_interval(card.scheduled_days)
    );
    println!("{}: {}", "Due".white().bold(), card.due.format("%Y-%m-%d %H:%M:%S"));
    println!("{}: {} / {}", "Reps / Lapses".white().bold(), card.reps, card.lapses);
}

/// Run preview command
fn run_preview(
    scheduler: &FSRSScheduler,
    card: Option<PathBuf>,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let card = load_card(card, now)?;
    let preview = scheduler.preview(&card, now)?;

    if json {
        return print_json(&preview.intervals());
    }

    println!("{}", "=== Cadence Preview ===".cyan().bold());
    println!();
    println!(
        "{}: {}  {}: {:.1}%",
        "State".white().bold(),
        card.state,
        "Retrievability".white().bold(),
        scheduler.current_retrievability(&card, now) * 100.0
    );
    println!();

    for (rating, result) in preview.iter() {
        let label = format!("{:<6}", rating.label());
        let label = match rating {
            Rating::Again => label.red(),
            Rating::Hard => label.yellow(),
            Rating::Good => label.green(),
            Rating::Easy => label.cyan(),
        };
        println!(
            "  {} {:>10}  {} {:.2}  -> {}",
            label.bold(),
            format_interval(result.card.scheduled_days),
            "S".dimmed(),
            result.card.stability,
            result.card.state
        );
    }
    Ok(())
}

/// Run simulate command
fn run_simulate(
    scheduler: &FSRSScheduler,
    ratings: &[Rating],
    start: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let mut card = FSRSState::new(start);
    let mut steps: Vec<(f64, ReviewResult)> = Vec::with_capacity(ratings.len());

    for &rating in ratings {
        // Each review happens when the card falls due
        let at = card.due;
        let r = scheduler.current_retrievability(&card, at);
        let result = scheduler.schedule(&card, rating, at)?;
        card = result.card.clone();
        steps.push((r, result));
    }

    if json {
        let logs: Vec<_> = steps.iter().map(|(_, result)| result).collect();
        return print_json(&logs);
    }

    println!("{}", "=== Cadence Simulation ===".cyan().bold());
    println!();
    println!(
        "{}",
        format!(
            "{:>4}  {:<6}  {:<10}  {:>6}  {:>10}  {:>7}  {:>10}  {}",
            "#", "Rating", "State", "R", "Stability", "Diff", "Interval", "Due"
        )
        .dimmed()
    );

    for (i, (r, result)) in steps.iter().enumerate() {
        println!(
            "{:>4}  {:<6}  {:<10}  {:>5.1}%  {:>10.4}  {:>7.4}  {:>10}  {}",
            i + 1,
            result.log.rating.label(),
            result.card.state.as_str(),
            r * 100.0,
            result.card.stability,
            result.card.difficulty,
            format_interval(result.card.scheduled_days),
            result.card.due.format("%Y-%m-%d")
        );
    }

    let span = card.due - start;
    println!();
    println!(
        "{}: {} reviews over {} days, {} lapses",
        "Summary".white().bold(),
        card.reps,
        span.num_days().max(0),
        card.lapses
    );
    if span > Duration::days(365) {
        println!("{}", "Next review is more than a year out.".dimmed());
    }
    Ok(())
}

/// Run queue command
fn run_queue(
    scheduler: &FSRSScheduler,
    cards_path: &Path,
    request: &SessionRequest,
    sort: bool,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let cards: Vec<Card> = read_json(cards_path)?;
    let mut session = DefaultSessionPolicy.compose(&cards, request, now);
    if sort {
        session = sort_by_priority(&session, now);
    }

    if json {
        return print_json(&session);
    }

    println!("{}", "=== Cadence Review Session ===".cyan().bold());
    println!();

    if session.is_empty() {
        println!("{}", "Nothing to review.".dimmed());
        return Ok(());
    }

    for (i, card) in session.iter().enumerate() {
        let overdue = if card.is_overdue(now) {
            "overdue".red()
        } else {
            "".normal()
        };
        println!(
            "{:>4}. [{:<10}] {:.0}%  {}  {} {}",
            i + 1,
            card.state().as_str(),
            card.retrievability(scheduler, now) * 100.0,
            truncate(&card.front, 48),
            card.due().format("%Y-%m-%d %H:%M").to_string().dimmed(),
            overdue
        );
    }

    println!();
    println!("{}: {}", "Total".white().bold(), session.len());
    Ok(())
}

/// Run params command
fn run_params(resolved: &config::ResolvedParams, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&resolved.params);
    }

    let params = &resolved.params;
    println!("{}", "=== Cadence Parameters ===".cyan().bold());
    println!();
    println!("{}: {}", "Source".white().bold(), resolved.source);
    if !resolved.overrides.is_empty() {
        println!("{}: {}", "Overrides".white().bold(), resolved.overrides.join(", "));
    }
    if let Some(dir) = config::config_dir() {
        println!(
            "{}: {}",
            "Config File".white().bold(),
            dir.join(config::PARAMS_FILE).display()
        );
    }
    println!(
        "{}: {:.1}%",
        "Request Retention".white().bold(),
        params.request_retention * 100.0
    );
    println!(
        "{}: {} days ({})",
        "Maximum Interval".white().bold(),
        params.maximum_interval,
        format_interval(params.maximum_interval)
    );
    println!("{}:", "Weights".white().bold());
    for (i, chunk) in params.w.chunks(4).enumerate() {
        let values: Vec<String> = chunk.iter().map(|w| format!("{:>8.4}", w)).collect();
        println!("  w{:<2}- {}", i * 4, values.join(" "));
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
