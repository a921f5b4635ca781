use clap::Parser;
use owo_colors::{OwoColorize, Style};
use rekur_core::error::{CoreError, StoreError};
use rekur_core::repository::SqliteTaskStore;
use rekur_core::scheduler::TaskScheduler;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    // stdout belongs to command output; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let store = match SqliteTaskStore::connect(&config.database_path).await {
        Ok(store) => store,
        Err(e) => {
            handle_error(e.into());
            std::process::exit(1);
        }
    };
    tracing::debug!(database = %config.database_path, owner = %config.owner_id, "store opened");

    let owner = config.owner_id;
    let scheduler = TaskScheduler::new(store, config.scheduler);

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&scheduler, owner, command).await,
        cli::Commands::List(command) => commands::list::list_tasks(&scheduler, owner, command).await,
        cli::Commands::Show(command) => commands::show::show_task(&scheduler, owner, command).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&scheduler, owner, command).await,
        cli::Commands::Delete(command) => commands::delete::delete_task(&scheduler, owner, command).await,
        cli::Commands::Do(command) => commands::r#do::do_task(&scheduler, owner, command).await,
        cli::Commands::Undo(command) => commands::undo::undo_task(&scheduler, owner, command).await,
        cli::Commands::Series(command) => commands::series::show_series(&scheduler, owner, command).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::Validation(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidScope(_) => {
                eprintln!("{} {}", "Error:".style(error_style), core_error);
                eprintln!("Use {} for tasks that do not repeat.", "--scope single".yellow());
            }
            CoreError::Store(store_error) => {
                eprintln!("{} {}", "Error:".style(error_style), store_error);
                if let StoreError::Partial { applied, source } = store_error {
                    eprintln!(
                        "  {} change(s) were saved before the failure: {}",
                        applied.yellow(),
                        source
                    );
                } else if let Some(source) = std::error::Error::source(store_error) {
                    eprintln!("  caused by: {}", source);
                }
            }
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
