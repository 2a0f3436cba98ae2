//! Maintenance utilities for the vector gateway

use clap::{Parser, Subcommand};
use core_config::env_flag;
use core_config::tracing::install_color_eyre;
use domain_documents::{DocumentStore, QdrantConfig, QdrantStore};

#[derive(Parser)]
#[command(name = "gateway-cli", about = "Maintenance utilities for the vector gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Delete a single collection
    DropCollection { name: String },
    /// Delete every collection in the store
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let store = QdrantStore::connect(QdrantConfig::from_env()?)?;

    match cli.command {
        Command::DropCollection { name } => {
            if store.delete_collection(&name).await? {
                println!("Collection '{}' deleted", name);
            } else {
                eprintln!("Collection '{}' not found", name);
                std::process::exit(1);
            }
        }
        Command::Reset { yes } => {
            if !env_flag("ALLOW_RESET") {
                eyre::bail!("resetting is disabled; set ALLOW_RESET=true to enable");
            }
            if !yes {
                eyre::bail!("refusing to reset without --yes");
            }

            let dropped = store.reset().await?;
            println!("Reset complete, {} collections deleted", dropped);
        }
    }

    Ok(())
}
