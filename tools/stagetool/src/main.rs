mod render;
mod script;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use engine::HeadlessRunner;
use puzzle::catalog::StageCatalog;
use puzzle::logging;
use puzzle::logic::PuzzleLogic;
use puzzle::session::GameEvent;
use puzzle::settings::SettingsStore;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "stagetool")]
#[command(about = "Validate, inspect and headlessly play puzzle stages")]
struct Cli {
    /// Stage catalog JSON; the built-in catalog when omitted.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Validate,
    Show {
        /// Stage index or name.
        stage: String,
    },
    Play {
        stage: String,
        #[arg(long)]
        script: PathBuf,
        /// Write a JSON report of the run.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = logging::resolve_level(cli.verbose, |k| std::env::var(k).ok());
    logging::init_log(level, None).context("init logging")?;

    let catalog = load_catalog(cli.catalog.as_deref())?;
    match cli.command {
        Commands::Validate => cmd_validate(&catalog),
        Commands::Show { stage } => cmd_show(&catalog, &stage),
        Commands::Play {
            stage,
            script,
            report,
        } => cmd_play(&catalog, &stage, &script, report.as_deref()),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<StageCatalog> {
    match path {
        Some(path) => StageCatalog::load_json_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(StageCatalog::builtin()),
    }
}

fn resolve_stage(catalog: &StageCatalog, stage: &str) -> Result<usize> {
    if let Ok(index) = stage.parse::<usize>() {
        if index < catalog.len() {
            return Ok(index);
        }
        bail!("Stage index {} out of range ({} stages)", index, catalog.len());
    }
    catalog
        .position_by_name(stage)
        .with_context(|| format!("Unknown stage '{}'", stage))
}

fn cmd_validate(catalog: &StageCatalog) -> Result<()> {
    let mut failures = 0usize;
    for (index, asset) in catalog.stages.iter().enumerate() {
        let issues = asset.lint();
        match asset.to_stage_data() {
            Ok(_) if issues.is_empty() => println!("[ok] {index} {}", asset.name),
            Ok(_) => {
                println!("[warn] {index} {}", asset.name);
                for issue in &issues {
                    println!("    {issue}");
                }
            }
            Err(e) => {
                failures += 1;
                println!("[error] {index} {}: {e}", asset.name);
            }
        }
    }

    if failures > 0 {
        bail!("Validation failed: {failures} unplayable stage(s)");
    }
    println!("OK: {} stages", catalog.len());
    Ok(())
}

fn cmd_show(catalog: &StageCatalog, stage: &str) -> Result<()> {
    let index = resolve_stage(catalog, stage)?;
    let settings = SettingsStore::from_env().load();
    let session = puzzle::session::PuzzleSession::from_catalog(catalog, index, settings)?;

    print!("{}", render::render_stage(session.stage()));
    print!("{}", render::render_tools(session.stage()));
    print!("{}", render::render_progress(session.progress()));
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayReport {
    stage: String,
    generated_at: DateTime<Utc>,
    steps: usize,
    events: Vec<GameEvent>,
    cleared: bool,
    rock_count: usize,
    fingerprint: String,
}

fn cmd_play(catalog: &StageCatalog, stage: &str, script: &Path, report: Option<&Path>) -> Result<()> {
    let index = resolve_stage(catalog, stage)?;
    let text = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let lines = script::parse_script(&text)?;

    let settings = SettingsStore::from_env().load();
    let logic = PuzzleLogic::new(catalog.instantiate(index)?, settings);
    let mut runner = HeadlessRunner::new(logic);
    let mut all_events = Vec::new();

    for line in &lines {
        runner.step(line.action);
        let events = runner.drain_events();
        if events.is_empty() {
            println!("{:>4}  {}", line.line_no, line.text);
        } else {
            let summary: Vec<String> = events.iter().map(describe_event).collect();
            println!("{:>4}  {}  -> {}", line.line_no, line.text, summary.join(", "));
        }
        all_events.extend(events);
    }

    let session = runner.state();
    println!();
    print!("{}", render::render_stage(session.stage()));
    print!("{}", render::render_progress(session.progress()));

    if let Some(path) = report {
        let report = PlayReport {
            stage: session.stage().name.clone(),
            generated_at: Utc::now(),
            steps: runner.steps(),
            events: all_events,
            cleared: session.is_cleared(),
            rock_count: session.stage().rock_count(),
            fingerprint: session.stage().fingerprint()?,
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
        log::info!("wrote play report to {}", path.display());
    }
    Ok(())
}

fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::GridChanged => "grid changed".to_string(),
        GameEvent::PatternCopied { tool, cells } => format!("tool {tool} copied {cells}"),
        GameEvent::ProgressAcquired { key, slot } => format!("acquired {key}[{slot}]"),
        GameEvent::StageCleared => "STAGE CLEARED".to_string(),
        GameEvent::RocksMoved { moves } => format!("{} rocks moved", moves.len()),
        GameEvent::RocksDestroyed { positions } => format!("{} rocks destroyed", positions.len()),
        GameEvent::ToolConsumed { tool } => format!("tool {tool} used up"),
        GameEvent::Rejected { reason } => format!("rejected: {reason}"),
    }
}
