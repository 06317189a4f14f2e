//! alertboard command line entry point.
//!
//! Each invocation loads the merged list once, applies the requested action
//! and prints the result.

mod render;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alertboard_client::{AlertApi, NotificationApi, build_http_client};
use alertboard_common::{AppError, Config, FileSessionStore, Session};
use alertboard_core::{CategoryFilter, ListController, LoadOutcome, SortMode};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const RETRY_HINT: &str = "Sign in again with `alertboard login <token>`, then retry.";

#[derive(Parser)]
#[command(name = "alertboard")]
#[command(about = "Notifications and security alerts from the vault backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the merged notification and alert list
    List {
        /// Category to show, or `all`
        #[arg(long, default_value = "all")]
        category: CategoryFilter,

        /// Sort order: `date` or `priority`
        #[arg(long, default_value = "date")]
        sort: SortMode,

        /// Only show unread records
        #[arg(long)]
        unread: bool,

        /// Print the panel snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark one record read
    Read {
        /// Record id
        id: String,
    },
    /// Mark every record read
    ReadAll,
    /// Delete one record
    Delete {
        /// Record id
        id: String,
    },
    /// Delete every record
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Store a bearer token in the session file
    Login {
        /// Bearer token
        token: String,
    },
    /// Remove the session file
    Logout,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "alertboard=info".into());
    let (plain, structured) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None)
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    Ok(config)
}

fn build_controller(config: &Config, session: Arc<FileSessionStore>) -> Result<ListController> {
    let http = build_http_client(config)?;
    let notifications = NotificationApi::from_config(http.clone(), config)?;
    let alerts = AlertApi::from_config(http, config)?;
    Ok(
        ListController::new(Arc::new(notifications), Arc::new(alerts), session)
            .with_alert_page_size(config.alerts.effective_page_size()),
    )
}

fn confirm_clear(count: usize) -> bool {
    print!("Delete all {count} record(s)? [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let store = Arc::new(FileSessionStore::new(&config.session.path));

    match &cli.command {
        Commands::Login { token } => {
            store.save(&Session::authenticated(token.as_str()))?;
            println!("Session saved to {}.", store.path().display());
            return Ok(());
        }
        Commands::Logout => {
            store.clear()?;
            println!("Signed out.");
            return Ok(());
        }
        _ => {}
    }

    let controller = build_controller(&config, store)?;

    match cli.command {
        Commands::List {
            category,
            sort,
            unread,
            json,
        } => {
            let controller = controller.with_selection(category, sort);
            if controller.load().await? == LoadOutcome::Superseded {
                warn!("Load was superseded, showing the newer result");
            }
            let snapshot = controller.snapshot().await;
            if json {
                println!("{}", render::json(&snapshot)?);
            } else {
                print!("{}", render::list(&snapshot, unread, chrono::Utc::now()));
            }
        }
        Commands::Read { id } => {
            controller.load().await?;
            controller.mark_read(&id).await?;
            println!("Marked {id} read. {} unread.", controller.unread_count().await);
        }
        Commands::ReadAll => {
            controller.load().await?;
            let marked = controller.mark_all_read().await?;
            println!("Marked {marked} record(s) read.");
        }
        Commands::Delete { id } => {
            controller.load().await?;
            controller.delete(&id).await?;
            println!("Deleted {id}.");
        }
        Commands::Clear { yes } => {
            controller.load().await?;
            let outcome = controller
                .clear_all(move |count| yes || confirm_clear(count))
                .await?;
            println!("{}", render::cleared(outcome));
        }
        Commands::Login { .. } | Commands::Logout => {}
    }

    Ok(())
}

/// Exit status and stderr text for a failed run. Sign-in problems exit 2.
fn failure(err: &anyhow::Error) -> (u8, String) {
    let auth = err
        .downcast_ref::<AppError>()
        .is_some_and(AppError::is_authentication);
    if auth {
        (2, format!("Error: {err:#}\n{RETRY_HINT}"))
    } else {
        (1, format!("Error: {err:#}"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (status, report) = failure(&e);
            eprintln!("{report}");
            ExitCode::from(status)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alertboard_core::Category;
    use clap::CommandFactory;

    #[test]
    fn test_authentication_failure_exits_2_with_hint() {
        let err = anyhow::Error::from(AppError::AuthenticationRequired);
        let (status, report) = failure(&err);
        assert_eq!(status, 2);
        assert_eq!(report, format!("Error: Authentication required\n{RETRY_HINT}"));

        let err = anyhow::Error::from(AppError::AuthenticationRequired).context("Loading panel");
        assert_eq!(failure(&err).0, 2);
    }

    #[test]
    fn test_other_failures_exit_1_without_hint() {
        let err = anyhow::Error::from(AppError::NotFound("n-9".to_string()));
        let (status, report) = failure(&err);
        assert_eq!(status, 1);
        assert_eq!(report, "Error: Not found: n-9");

        let (status, report) = failure(&anyhow::anyhow!("disk full"));
        assert_eq!(status, 1);
        assert!(!report.contains("login"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_arguments_parse_into_selection() {
        let cli = Cli::try_parse_from([
            "alertboard",
            "list",
            "--category",
            "Security",
            "--sort",
            "priority",
            "--unread",
        ])
        .unwrap();
        match cli.command {
            Commands::List {
                category,
                sort,
                unread,
                json,
            } => {
                assert_eq!(category, CategoryFilter::Only(Category::Security));
                assert_eq!(sort, SortMode::Priority);
                assert!(unread);
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_list_defaults_and_unknown_category() {
        let cli = Cli::try_parse_from(["alertboard", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                category: CategoryFilter::All,
                sort: SortMode::Date,
                unread: false,
                json: false,
            }
        ));
        assert!(Cli::try_parse_from(["alertboard", "list", "--category", "weather"]).is_err());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["alertboard", "clear", "--yes", "-c", "alertboard.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alertboard.toml")));
        assert!(matches!(cli.command, Commands::Clear { yes: true }));
    }
}
