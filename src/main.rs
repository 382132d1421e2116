//! Wordhunt - unified CLI
//!
//! Validates, shows and plays word search puzzle files against a SQLite
//! attempt database.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use wordhunt::wordhunt_engine::{
    AccessError, MatchContext, MatchId, MatchWindow, PlayError, PlayService, PlayerId, SessionSummary, rank,
};
use wordhunt::{AttemptRepository, WordhuntConfig, load_puzzle, render_board, run_session};

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = WordhuntConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }

    match cli.command {
        Command::Validate { file } => run_validate(&file),
        Command::Show { file, reveal } => run_show(&file, reveal),
        Command::Play {
            file,
            player,
            match_id,
            opens_at,
            closes_at,
        } => run_play(
            &config,
            &file,
            MatchContext::new(
                PlayerId::new(player),
                MatchId::new(match_id),
                MatchWindow::new(opens_at, closes_at),
            ),
        ),
        Command::Attempt { player, match_id } => {
            run_attempt(&config, PlayerId::new(player), MatchId::new(match_id))
        }
        Command::Ranking { match_id } => run_ranking(&config, MatchId::new(match_id)),
    }
}

/// Check a puzzle file
#[instrument(skip_all, fields(file = %file.display()))]
fn run_validate(file: &Path) -> Result<()> {
    let puzzle = load_puzzle(file).with_context(|| format!("Validating {}", file.display()))?;
    println!(
        "OK: {}x{} board, {} words, {}",
        puzzle.width(),
        puzzle.height(),
        puzzle.placements().len(),
        if puzzle.is_compiled() { "compiled" } else { "not compiled" }
    );
    Ok(())
}

/// Print a puzzle
#[instrument(skip_all, fields(file = %file.display(), reveal))]
fn run_show(file: &Path, reveal: bool) -> Result<()> {
    let puzzle = load_puzzle(file)?;
    let metadata = puzzle.metadata();
    println!("{} ({}, {})", metadata.title(), metadata.theme(), metadata.difficulty());
    if !metadata.description().is_empty() {
        println!("{}", metadata.description());
    }

    if puzzle.is_compiled() {
        println!("{}", render_board(&puzzle, &BTreeSet::new()));
    } else {
        println!("{}x{} board, no letter grid yet", puzzle.width(), puzzle.height());
    }

    if reveal {
        for placement in puzzle.placements() {
            println!(
                "{:<20} {} -> {}  {}",
                placement.word().as_str(),
                placement.start(),
                placement.end(),
                placement.direction()
            );
        }
    } else {
        println!("{} words hidden", puzzle.placements().len());
    }
    Ok(())
}

/// Play one match from stdin
#[instrument(skip_all, fields(file = %file.display(), player = %context.player_id(), match_id = %context.match_id()))]
fn run_play(config: &WordhuntConfig, file: &Path, context: MatchContext) -> Result<()> {
    let puzzle = Arc::new(load_puzzle(file)?);
    let repo = AttemptRepository::open(config.db_path().clone())?;
    let service = PlayService::new(repo).with_rules(*config.scoring());

    let session = match service.open(context, puzzle, Utc::now()) {
        Ok(session) => session,
        Err(PlayError::Access(AccessError::AlreadyAttempted { previous })) => {
            println!("You already played this match.");
            println!("{}", SessionSummary::from(previous.as_ref()));
            return Ok(());
        }
        Err(e) => bail!(e),
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let record = run_session(&service, session, stdin.lock(), &mut stdout, Utc::now)?;
    info!(score = record.score(), outcome = %record.outcome(), "Match over");
    Ok(())
}

/// Print a stored attempt
#[instrument(skip(config))]
fn run_attempt(config: &WordhuntConfig, player: PlayerId, match_id: MatchId) -> Result<()> {
    let service = PlayService::new(AttemptRepository::open(config.db_path().clone())?);
    match service.previous(&player, &match_id)? {
        Some(summary) => println!("{}", summary),
        None => println!("{} has not played {} yet", player, match_id),
    }
    Ok(())
}

/// Print a match leaderboard
#[instrument(skip(config))]
fn run_ranking(config: &WordhuntConfig, match_id: MatchId) -> Result<()> {
    let repo = AttemptRepository::open(config.db_path().clone())?;
    let records = repo.list_attempts(&match_id)?;
    if records.is_empty() {
        println!("No attempts for {}", match_id);
        return Ok(());
    }
    for entry in rank(&records) {
        println!("{}", entry);
    }
    Ok(())
}
