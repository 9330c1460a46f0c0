// src/main.rs

mod cli;
mod commands;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod report;
mod stats;
mod streak;
mod view;

use clap::Parser;
use cli::{Cli, Commands};
use commands::LogArgs;
use config::Config;
use error::Result;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("mlog: {}", e);
            if e.is_bad_request() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_level);

    match cli.command {
        Commands::Init => commands::handle_init(&config),
        Commands::Log {
            message,
            category,
            outcome,
            duration,
            impact,
            day,
        } => commands::handle_log(
            &config,
            LogArgs {
                message,
                category,
                outcome,
                duration,
                impact,
                day,
            },
        ),
        Commands::Task { title, day } => commands::handle_task(&config, &title, day.as_deref()),
        Commands::Toggle { id, day } => commands::handle_toggle(&config, id, day.as_deref()),
        Commands::Show { day } => commands::handle_show(&config, day.as_deref()),
        Commands::Export { day, output } => commands::handle_export(&config, day.as_deref(), output),
        Commands::Weekly { end, output } => commands::handle_weekly(&config, end.as_deref(), output),
        Commands::Status => commands::handle_status(&config),
    }
}
