//! mlprobe - install, verify and clean up the MATLAB Engine for Python
//!
//! Thin binary over the verifier crate: parses flags, loads configuration,
//! wires the host seams and renders the results.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod ops;
mod setup;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::ops::OperationResult;
use crate::setup::SystemSetup;
use clap::Parser;
use mlprobe_config::Config;
use mlprobe_events::{EventReceiver, EventSender};
use mlprobe_host::SessionRegistry;
use mlprobe_types::{CleanupPolicy, ColorChoice, MatchMode, OutputFormat};
use std::process;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    let outcome = run(cli).await;

    // process::exit skips destructors, so the shared session child is
    // stopped explicitly on every path
    if let Err(e) = SessionRegistry::global().shutdown().await {
        warn!(error = %e, "failed to stop the shared host session");
    }

    match outcome {
        Ok(result) if result.is_failure() => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            error!(code = e.code(), "Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(2);
        }
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<OperationResult, CliError> {
    info!("Starting mlprobe v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let color_choice = if config.general.default_output == OutputFormat::Plain {
        ColorChoice::Never
    } else {
        config.general.color
    };

    // Create event channel
    let (event_sender, event_receiver) = mlprobe_events::channel();

    let setup = SystemSetup::new(config, event_sender.clone())?;

    let renderer = OutputRenderer::new(json_output, color_choice);

    let colors_enabled = match color_choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

    let result = execute_command_with_events(
        cli.command,
        &setup,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed");
    Ok(result)
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    setup: &SystemSetup,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, setup, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    setup: &SystemSetup,
    event_sender: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Run { scenario, .. } => ops::run(setup, &scenario.kinds(), event_sender).await,
        Commands::HostInfo => ops::host_info(setup).await,
        Commands::Status => ops::status(setup).await,
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "mlprobe-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        if let Ok(file) = std::fs::File::create(&log_file) {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(
                            "info,mlprobe=debug,mlprobe_host=debug,mlprobe_verifier=debug",
                        )
                    }),
                )
                .init();

            if !json_mode {
                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            return;
        }

        if !json_mode {
            eprintln!("Warning: Failed to create log file {}", log_file.display());
        }
    }

    if json_mode {
        // JSON mode: keep stdout and stderr clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: events are rendered by the handler, only stray
        // library errors reach stderr through tracing
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("error,mlprobe::events=off")
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Run {
        strict,
        inline_cleanup,
        ..
    } = command
    {
        if *strict {
            config.verify.match_mode = MatchMode::Strict;
        }
        if *inline_cleanup {
            config.verify.cleanup_policy = CleanupPolicy::Inline;
        }
    }
}
