mod commands;
pub mod error;
mod utils;


use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backend::{RestBackend, TableBackend};
use crate::config::BackendConfig;
use crate::repository::RecordId;
use commands::row;
use error::CliResult;

#[derive(Parser)]
#[command(name = "tablerepo")]
#[command(author, version, about = "CRUD access to remote tables", long_about = None)]
pub struct Cli {
    /// Override the backend URL (default: TABLEREPO_URL env or http://localhost:54321)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API key sent as `apikey` and bearer token (default: TABLEREPO_KEY env)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Database schema to target (default: TABLEREPO_SCHEMA env or public)
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Output format (table or json)
    #[arg(long, global = true, default_value = "table")]
    pub format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every row of a table
    List {
        /// Table name
        table: String,
    },
    /// Get a row by ID
    Get {
        /// Table name
        table: String,
        /// Row ID
        id: RecordId,
    },
    /// Get rows by comma-separated IDs
    GetMany {
        /// Table name
        table: String,
        /// Row IDs, e.g. 1,2,3
        ids: String,
    },
    /// Insert a row from a JSON object
    Insert {
        /// Table name
        table: String,
        /// Row as JSON, e.g. '{"name": "widget"}'
        json: String,
    },
    /// Update a row with the fields of a JSON object
    Update {
        /// Table name
        table: String,
        /// Row ID
        id: RecordId,
        /// Changed fields as JSON
        json: String,
    },
    /// Delete a row
    Delete {
        /// Table name
        table: String,
        /// Row ID
        id: RecordId,
        /// Confirm the deletion
        #[arg(long)]
        force: bool,
    },
    /// Count rows in a table
    Count {
        /// Table name
        table: String,
    },
}

/// Initialize tracing subscriber with env filter, logging to stderr
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablerepo=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute<B: TableBackend>(backend: &B, command: Commands, format: &str) -> CliResult<String> {
    match command {
        Commands::List { table } => row::list_rows(backend, &table, format).await,
        Commands::Get { table, id } => row::get_row(backend, &table, id, format).await,
        Commands::GetMany { table, ids } => row::get_rows(backend, &table, &ids, format).await,
        Commands::Insert { table, json } => row::insert_row(backend, &table, &json).await,
        Commands::Update { table, id, json } => row::update_row(backend, &table, id, &json).await,
        Commands::Delete { table, id, force } => row::delete_row(backend, &table, id, force).await,
        Commands::Count { table } => row::count_rows(backend, &table).await,
    }
}

pub async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing();

    let Some(command) = cli.command else {
        // Show help when no command provided
        let _ = Cli::parse_from(["tablerepo", "--help"]);
        return Ok(());
    };

    let config = BackendConfig::resolve(cli.url, cli.key, cli.schema)?;
    let backend = RestBackend::new(&config);

    let output = execute(&backend, command, &cli.format).await?;
    println!("{}", output);
    Ok(())
}
