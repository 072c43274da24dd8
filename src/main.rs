use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cueline::app::{PerformOptions, run_cast_command, run_match_command, run_perform_command};
use cueline::cli::{Cli, Commands, ConfigAction};
use cueline::config::Config;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let color = std::io::stdout().is_terminal();

    match cli.command {
        Commands::Perform {
            script,
            humans,
            transcript,
            start,
            threshold,
            silence,
            no_auto_advance,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = PerformOptions {
                humans,
                transcript,
                start,
                threshold,
                silence,
                no_auto_advance,
                json,
                color: color && !json,
                quiet: cli.quiet,
            };
            run_perform_command(config, &script, options)
                .with_context(|| format!("failed to perform {}", script.display()))?;
        }
        Commands::Match {
            expected,
            transcripts,
            threshold,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_match_command(
                config,
                &expected,
                &transcripts,
                threshold,
                json,
                color && !json,
            )?;
        }
        Commands::Cast { script } => {
            run_cast_command(&script, color)
                .with_context(|| format!("failed to read {}", script.display()))?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cueline", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "cueline=debug",
        (false, _) => "cueline=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
    {
        eprintln!("Failed to initialize logging: {e}");
    }
}

/// Load config from the given path, or the default location, then apply
/// environment overrides.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        },
    };

    Ok(config.with_env_overrides()?)
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(Path::to_path_buf)
                .or_else(Config::default_path)
                .context("no configuration directory on this system")?;
            let marker = if path.exists() {
                "exists".green().to_string()
            } else {
                "not created".dimmed().to_string()
            };
            println!("{} ({marker})", path.display());
        }
    }
    Ok(())
}
