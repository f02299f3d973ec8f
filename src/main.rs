//! SEA CLI - Statistical Energy Analysis
//!
//! Command-line interface for the SEA engine.

use clap::Parser;
use env_logger::Env;
use log::info;

use sea_engine::cli::{commands, Cli, Commands};
use sea_engine::config::EngineConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose {
        "debug".to_string()
    } else {
        config_log_level(&cli).unwrap_or_else(|| "info".to_string())
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("SEA Engine v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("SEA Engine v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

/// Log level from the engine config passed to `solve`, if any.
fn config_log_level(cli: &Cli) -> Option<String> {
    match &cli.command {
        Some(Commands::Solve {
            config: Some(path), ..
        }) => EngineConfig::from_file(path).ok().map(|c| c.log_level),
        _ => None,
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::New { path, name, config } => {
            commands::new_project(&path, name.as_deref(), config.as_deref())?
        }
        Commands::Template { kind, path, config } => {
            commands::template_project(&kind, &path, config.as_deref())?
        }
        Commands::Solve {
            project,
            config,
            serial,
            out,
            csv,
        } => commands::solve_project(
            &project,
            config.as_deref(),
            serial,
            out.as_deref(),
            csv.as_deref(),
        )?,
        Commands::Geometry { project } => commands::print_geometry(&project)?,
        Commands::Materials => commands::print_materials()?,
    }
    Ok(())
}
