use anyhow::Result;
use clap::{Parser, Subcommand};
use geotask_core::config::BackendKind;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "geotask")]
#[command(about = "geotask CLI - inspect and maintain tutorial session results", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding sessions and the session id
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Session backend: local or document
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current session id, creating it if needed
    SessionId {
        /// Forget the current id so the next run starts a new session
        #[arg(long)]
        reset: bool,
    },
    /// Browse and manage stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Read or save a single task result
    Result {
        #[command(subcommand)]
        action: ResultAction,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List sessions, newest first, with progress
    List {
        /// Only sessions whose id contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the results of one session
    Show {
        id: String,
        /// Print the stored results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a session and all its results
    Delete { id: String },
}

#[derive(Subcommand)]
enum ResultAction {
    /// Print the saved result of a task
    Get {
        task_id: u32,
        /// Session to read from (defaults to the current session)
        #[arg(long)]
        session: Option<String>,
    },
    /// Save a task result from a JSON payload file
    Save {
        task_id: u32,
        /// File containing {"type":"polygon","polygons":[...]} or {"type":"popup","popups":[...]}
        #[arg(long)]
        file: PathBuf,
        /// Session to save into (defaults to the current session)
        #[arg(long)]
        session: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let overrides = commands::Overrides {
        config: cli.config,
        data_dir: cli.data_dir,
        backend: cli.backend,
    };
    let app = commands::App::open(overrides).await?;

    match cli.command {
        Commands::SessionId { reset } => commands::session_id::run(&app, reset).await?,
        Commands::Sessions { action } => match action {
            SessionsAction::List { search } => commands::sessions::list(&app, search).await?,
            SessionsAction::Show { id, json } => commands::sessions::show(&app, &id, json).await?,
            SessionsAction::Delete { id } => commands::sessions::delete(&app, &id).await?,
        },
        Commands::Result { action } => match action {
            ResultAction::Get { task_id, session } => {
                commands::result::get(&app, task_id, session).await?
            }
            ResultAction::Save {
                task_id,
                file,
                session,
            } => commands::result::save(&app, task_id, &file, session).await?,
        },
    }

    Ok(())
}
