use crate::auth::sessions::create_session;
use crate::config::AppConfig;
use crate::db::{init_db, Database, SqliteParcelStore};
use crate::responses::error_to_response;
use crate::router::{handle, AppState};
use astra::Server;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod analytics;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod responses;
mod router;
mod spreadsheets;
mod templates;


#[derive(Parser)]
#[command(name = "parcel_comps")]
#[command(about = "Parcel comparables and classification API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Issue a session token for a user and print it
    IssueSession {
        #[arg(value_name = "USERNAME")]
        username: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration rejected: {e}");
            std::process::exit(1);
        }
    };

    let db = Database::new(&config.db_path);
    if let Err(e) = init_db(&db) {
        error!(path = %config.db_path, "database initialization failed: {e}");
        std::process::exit(1);
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(db, config),
        Commands::IssueSession { username } => {
            let now = Utc::now().timestamp();
            match db.with_conn(|conn| create_session(conn, &username, now)) {
                Ok(token) => println!("{token}"),
                Err(e) => {
                    error!(%username, "could not issue session: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn serve(db: Database, config: AppConfig) {
    let store = match SqliteParcelStore::new(db, &config.table) {
        Ok(store) => store,
        Err(e) => {
            error!(table = %config.table, "parcel table unavailable: {e}");
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr;
    let workers = config.max_workers;
    let state = AppState { store, config };

    info!(%addr, workers, "starting server");

    let server = Server::bind(&addr).max_workers(workers);
    let result = server.serve(move |req, _info| {
        handle(req, &state).unwrap_or_else(error_to_response)
    });

    if let Err(e) = result {
        error!("server ended with error: {e}");
    }

    info!("server shut down");
}
