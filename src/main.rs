use buddy_desk::application::desk::BuddyDesk;
use buddy_desk::application::registry::AdvisorRegistry;
use buddy_desk::config::Config;
use buddy_desk::domain::ports::{AdvisorStoreBox, PaymentStoreBox, RequestStoreBox};
use buddy_desk::infrastructure::in_memory::{
    InMemoryAdvisorStore, InMemoryPaymentStore, InMemoryRequestStore,
};
use buddy_desk::interfaces::csv::advisor_reader::AdvisorReader;
use buddy_desk::interfaces::csv::advisor_writer::AdvisorWriter;
use buddy_desk::interfaces::http::{self, AppState};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Overrides BUDDY_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import advisors from a CSV file and print the imported rows.
    ImportAdvisors {
        /// Input advisors CSV file
        input: PathBuf,
    },
}

type Stores = (AdvisorStoreBox, RequestStoreBox, PaymentStoreBox);

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let (advisors, requests, payments) = open_stores(cli.db_path)?;

    match cli.command {
        Command::Serve { port } => {
            let config = Config::load().into_diagnostic()?;
            let port = port.unwrap_or(config.port);
            let desk = BuddyDesk::new(advisors, requests, payments, config.payment_settings());
            let state = AppState::new(desk, config.admin_token);
            http::serve(state, port).await.into_diagnostic()?;
        }
        Command::ImportAdvisors { input } => {
            let registry = AdvisorRegistry::new(advisors.as_ref(), requests.as_ref());
            let file = File::open(input).into_diagnostic()?;

            let mut imported = Vec::new();
            for row in AdvisorReader::new(file).advisors() {
                match row {
                    Ok(new_advisor) => match registry.create(new_advisor).await {
                        Ok(advisor) => imported.push(advisor),
                        Err(e) => warn!("Error importing advisor: {}", e),
                    },
                    Err(e) => warn!("Error reading advisor: {}", e),
                }
            }
            info!(count = imported.len(), "advisors imported");

            let stdout = io::stdout();
            let mut writer = AdvisorWriter::new(stdout.lock());
            writer.write_advisors(&imported).into_diagnostic()?;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use buddy_desk::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            ))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    (
        Box::new(InMemoryAdvisorStore::new()),
        Box::new(InMemoryRequestStore::new()),
        Box::new(InMemoryPaymentStore::new()),
    )
}
