//! chunkkv CLI
//!
//! Command-line interface for a local chunkkv database directory.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use chunkkv::{Config, Database};
use tracing_subscriber::{fmt, EnvFilter};

/// chunkkv CLI
#[derive(Parser, Debug)]
#[command(name = "chunkkv-cli")]
#[command(about = "CLI for the chunkkv block-chain key-value store")]
#[command(version)]
struct Args {
    /// Database directory
    #[arg(short, long, default_value = "./chunkkv_data")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new database directory
    Create {
        /// Max payload bytes per block
        #[arg(short, long, default_value = "100")]
        block_size: u64,

        /// Max blocks per chunk file
        #[arg(short, long, default_value = "10000")]
        chunk_size: u64,
    },

    /// Append a value and print its key
    Append {
        /// The value to store
        value: String,
    },

    /// Print the value stored under a key
    Read {
        /// The key to read
        key: u64,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: u64,
    },

    /// Show configuration and chunk files
    Info,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chunkkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> chunkkv::Result<()> {
    let mut db = match args.command {
        Commands::Create {
            block_size,
            chunk_size,
        } => {
            let config = Config::builder()
                .block_size(block_size)
                .chunk_size(chunk_size)
                .build();
            let db = Database::create(&args.dir, config)?;
            println!("created {}", db.dir().display());
            return db.close();
        }
        _ => Database::open(&args.dir)?,
    };

    // Run the command, but always close so the cursor is persisted
    let outcome = match args.command {
        Commands::Append { value } => db.append(value.as_bytes()).map(|key| println!("{}", key)),
        Commands::Read { key } => db
            .read(key)
            .map(|value| println!("{}", String::from_utf8_lossy(&value))),
        Commands::Delete { key } => db.delete(key),
        Commands::Info => {
            let config = db.config();
            println!("block size:         {}", config.block_size);
            println!("chunk size:         {}", config.chunk_size);
            println!("next free position: {}", config.next_free_position);
            println!("chunk files:        {}", db.chunk_count());
            println!("capacity (slots):   {}", db.capacity());
            Ok(())
        }
        Commands::Create { .. } => Ok(()),
    };

    let closed = db.close();
    outcome?;
    closed
}
