use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Service configuration, read from the command line with environment fallbacks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the persistent order database. Requires the `storage-rocksdb`
    /// feature; orders are kept in memory otherwise.
    #[arg(long, env = "DATA_SOURCE_URL", global = true)]
    pub data_source_url: Option<PathBuf>,

    /// Base URL of the payment service. Charges are recorded locally when unset.
    #[arg(long, env = "PAYMENT_SERVICE_URL", global = true)]
    pub payment_service_url: Option<String>,

    /// Deployment environment; `development` selects human-readable logs,
    /// anything else JSON.
    #[arg(long = "env", env = "ENV", default_value = "development", global = true)]
    pub environment: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Process a JSON-lines request file, printing one response per line
    Run {
        /// Input requests file
        input: PathBuf,
    },
    /// Serve JSON-lines requests over TCP
    Serve {
        #[arg(long, env = "APPLICATION_PORT", default_value_t = 3000)]
        port: u16,
    },
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
