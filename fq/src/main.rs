use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use freshquest::cli::{Cli, Command, OutputFormat};
use freshquest::config::Config;
use freshquest::{FileStorage, PredictionRequest, QuestSession, RevealGate, generate_predictions};

const BAR_WIDTH: usize = 20;

fn setup_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    // Log to a file so command output stays clean
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("freshquest.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }

    setup_logging(&config.log_dir(), cli.verbose).context("Failed to setup logging")?;
    info!(storage = %config.storage_dir.display(), "freshquest starting");

    let catalog = config.catalog().context("Failed to load steps")?;
    let mut session = QuestSession::open(config.storage(), catalog, config.session_options());

    match cli.command {
        Command::Status { format } => cmd_status(&session, format),
        Command::Steps => cmd_steps(&session),
        Command::Done { id } => {
            session.on_toggle_done(&id)?;
            let done = session.store().state().is_done(&id);
            let mark = if done { "✓".green() } else { "✗".yellow() };
            println!("{} {} is now {}", mark, id.cyan(), if done { "done" } else { "not done" });
            print_progress(&session);
            Ok(())
        }
        Command::Check { id, index } => {
            session.on_toggle_bullet(&id, index)?;
            let checked = session.store().state().is_checked(&id, index);
            println!(
                "{} {} bullet {}",
                if checked { "[x]".green() } else { "[ ]".normal() },
                id.cyan(),
                index
            );
            if session.step_statuses().iter().any(|s| s.id == id && s.ready_to_mark) {
                println!("{}", format!("Checklist complete, mark it done with: fq done {:?}", id).green());
            }
            Ok(())
        }
        Command::Predict { count, format } => cmd_predict(&session, &config, count, format),
        Command::Spin => cmd_spin(&mut session),
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn print_progress(session: &QuestSession<FileStorage>) {
    let metrics = session.metrics();
    println!(
        "Progress: {} {} ({}/{})",
        progress_bar(metrics.percent).cyan(),
        format!("{}%", metrics.percent).bold(),
        metrics.completed,
        metrics.total
    );
}

fn cmd_status(session: &QuestSession<FileStorage>, format: OutputFormat) -> Result<()> {
    let metrics = session.metrics();
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "percent": metrics.percent,
                "completed": metrics.completed,
                "total": metrics.total,
                "allComplete": metrics.all_complete,
                "gate": session.gate(),
                "steps": session.step_statuses(),
                "predictions": session.predictions(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            print_progress(session);
            println!();
            for status in session.step_statuses() {
                let mark = if status.done { "✓".green() } else { "·".dimmed() };
                let checked = status.bullets.iter().filter(|b| **b).count();
                println!(
                    "  {} {} {} {}",
                    mark,
                    status.title,
                    format!("({})", status.id).dimmed(),
                    format!("{}/{}", checked, status.bullets.len()).dimmed()
                );
                if status.ready_to_mark {
                    println!("      {}", "Checklist complete, mark the step as done".green());
                }
            }
            println!();
            match session.gate() {
                RevealGate::Locked => println!(
                    "Wheel: {} complete all steps to unlock it, you're at {}%",
                    "locked".yellow(),
                    metrics.percent
                ),
                RevealGate::Unlocked => println!("Wheel: {} run `fq spin`", "unlocked".green()),
            }
        }
    }
    Ok(())
}

fn cmd_steps(session: &QuestSession<FileStorage>) -> Result<()> {
    let state = session.store().state();
    for step in session.store().catalog().iter() {
        let mark = if state.is_done(&step.id) { "✓".green() } else { "·".dimmed() };
        println!("{} {} {}", mark, step.title.bold(), format!("({})", step.id).dimmed());
        if !step.summary.is_empty() {
            println!("    {}", step.summary);
        }
        for (i, bullet) in step.bullets.iter().enumerate() {
            let checked = u32::try_from(i).is_ok_and(|i| state.is_checked(&step.id, i));
            let box_ = if checked { "[x]".green() } else { "[ ]".normal() };
            println!("    {} {} {}", box_, i.to_string().dimmed(), bullet);
        }
        for link in &step.links {
            println!("    {} {}", format!("{} ↗", link.label).cyan(), link.href.dimmed());
        }
        println!();
    }
    Ok(())
}

fn cmd_predict(
    session: &QuestSession<FileStorage>,
    config: &Config,
    count: Option<NonZeroUsize>,
    format: OutputFormat,
) -> Result<()> {
    let predictions = match count {
        Some(count) => generate_predictions(&PredictionRequest {
            name: config.name.clone(),
            steps_left: session.store().catalog().titles_left(session.store().state()),
            locale: config.locale,
            count: count.get(),
        }),
        None => session.predictions().to_vec(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&predictions)?),
        OutputFormat::Text => {
            for (i, p) in predictions.iter().enumerate() {
                println!("{:>3}. {}", i + 1, p);
            }
        }
    }
    Ok(())
}

fn cmd_spin(session: &mut QuestSession<FileStorage>) -> Result<()> {
    let mut rng = rand::rng();
    match session.on_reveal_trigger(&mut rng) {
        Some(spin) => {
            let greeting = if session.name().is_empty() {
                "Great job!".to_string()
            } else {
                format!("Great job, {}!", session.name())
            };
            println!("{}", greeting.green());
            println!("{}", "YOUR FORTUNE".bold());
            println!("  {}", spin.result.cyan());
        }
        None if session.gate().is_unlocked() => {
            println!("{}", "There are no fortunes on the wheel to land on.".yellow());
        }
        None => {
            println!(
                "Complete all roadmap steps to unlock the wheel. You're at {}%, keep going!",
                session.percent()
            );
        }
    }
    Ok(())
}
