use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use arboard::Clipboard;
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    form::format_number, timer::clock_display, view::share_text, RatioCalculator, RecipeForm,
    ScoringClient, SessionController, Stopwatch, StopwatchStatus,
};
use shared::domain::BrewMethod;
use storage::{HistoryStore, Storage};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, normalize_database_url};
use render::{reveal_score, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "brewer", about = "Score coffee brew recipes and keep a brew log")]
struct Cli {
    /// Config file; `brewer.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a recipe to the scoring service and record the result.
    Score(ScoreArgs),
    /// Show or clear the brew history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Print the starting recipe of each brew method.
    Defaults {
        #[arg(long)]
        method: Option<BrewMethod>,
    },
    /// Water needed for a dose at a target ratio.
    Ratio {
        #[arg(long, default_value_t = client_core::ratio::DEFAULT_TARGET_RATIO)]
        ratio: f64,
        #[arg(long)]
        dose: f64,
    },
    /// Interactive brew stopwatch.
    Timer,
}

#[derive(ClapArgs, Debug)]
struct ScoreArgs {
    #[arg(long, default_value_t = BrewMethod::V60)]
    method: BrewMethod,
    #[arg(long)]
    dose: Option<String>,
    #[arg(long)]
    water: Option<String>,
    #[arg(long)]
    temp: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    grind: Option<String>,
    #[arg(long)]
    roast: Option<String>,
    /// Derive the water from the dose at this `1:ratio`.
    #[arg(long, conflicts_with = "water")]
    ratio: Option<f64>,
    /// Copy a recipe summary to the clipboard.
    #[arg(long)]
    copy: bool,
    #[arg(long)]
    no_animate: bool,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    List,
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = normalize_database_url(&database_url);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Defaults { method } => {
            print_defaults(method);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Ratio { ratio, dose } => {
            let calculator = RatioCalculator::new(ratio, dose);
            println!(
                "{}g coffee at 1:{} → {}g water",
                format_number(dose),
                format_number(ratio),
                format_number(calculator.water())
            );
            return Ok(ExitCode::SUCCESS);
        }
        Command::Timer => {
            run_timer().await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Score(_) | Command::History { .. } => {}
    }

    let storage = Storage::new(&settings.database_url).await.with_context(|| {
        format!(
            "failed to open brew history at '{}'",
            settings.database_url
        )
    })?;
    let history = HistoryStore::new(storage);
    let animate = matches!(&cli.command, Command::Score(args) if !args.no_animate);
    let renderer = Arc::new(TerminalRenderer { animate });
    let scorer = Arc::new(ScoringClient::new(&settings.server_url)?);
    info!(server_url = %settings.server_url, database_url = %settings.database_url, "brewer ready");
    let controller = SessionController::new(scorer, history, renderer);

    match cli.command {
        Command::Score(args) => score(&controller, args, animate).await,
        Command::History {
            action: HistoryAction::List,
        } => {
            controller.show_history().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::History {
            action: HistoryAction::Clear { yes },
        } => {
            if yes || confirm("Clear all brew history?").await? {
                controller.clear_history().await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Defaults { .. } | Command::Ratio { .. } | Command::Timer => Ok(ExitCode::SUCCESS),
    }
}

async fn score(
    controller: &SessionController,
    args: ScoreArgs,
    animate: bool,
) -> Result<ExitCode> {
    let mut form = RecipeForm::new(args.method);
    let overrides = [
        (&mut form.coffee_dose, args.dose),
        (&mut form.water_yield, args.water),
        (&mut form.temperature, args.temp),
        (&mut form.brew_time, args.time),
        (&mut form.grind_size, args.grind),
        (&mut form.roast_level, args.roast),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value;
        }
    }
    if let Some(ratio) = args.ratio {
        let mut calculator = RatioCalculator::seeded(&form.coffee_dose);
        calculator.ratio = ratio;
        form.apply_ratio(&calculator);
    }

    let entry = match controller.submit(&form).await {
        Ok(entry) => entry,
        Err(err) if err.is_reported() => return Ok(ExitCode::FAILURE),
        Err(err) => return Err(err.into()),
    };
    if animate {
        reveal_score(&entry.result).await;
    }

    if args.copy {
        let text = share_text(&form, &(entry.result.total_score.round() as i64).to_string());
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone())) {
            Ok(()) => println!("Recipe copied to clipboard."),
            Err(err) => {
                warn!(error = %err, "clipboard unavailable");
                println!("{text}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_defaults(method: Option<BrewMethod>) {
    let methods = match method {
        Some(method) => vec![method],
        None => BrewMethod::ALL.to_vec(),
    };
    for method in methods {
        let d = method.defaults();
        println!(
            "{:<12} {:>3}g coffee  {:>4}g water  {:>3}°C  {:>6}s  {:<12} {}",
            method.label(),
            format_number(d.coffee_dose),
            format_number(d.water_yield),
            format_number(d.temperature),
            d.brew_time,
            d.grind_size,
            d.roast_level
        );
    }
}

async fn confirm(question: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    stdout
        .write_all(format!("{question} [y/N] ").as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(io::stdin()).read_line(&mut answer).await?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn run_timer() -> Result<()> {
    println!("Enter: start/stop   r: reset   q: quit");
    let mut stopwatch = Stopwatch::new();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut refresh = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "q" => break,
                    "r" => stopwatch.reset(),
                    _ => {
                        if stopwatch.toggle() == StopwatchStatus::Stopped {
                            info!(elapsed_secs = stopwatch.elapsed_secs(), "brew timed");
                        }
                    }
                }
            }
            _ = refresh.tick() => {}
        }
        print!("\r{}  ", clock_display(stopwatch.elapsed_secs()));
        std::io::Write::flush(&mut std::io::stdout())?;
    }
    stopwatch.stop();
    println!();
    Ok(())
}
