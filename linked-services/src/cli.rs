use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

/// linkctl - manage the linked services of a data platform
#[derive(Debug, Parser)]
#[command(name = "linkctl", version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(long, env = "LINKCTL_CONFIG", default_value = "/etc/linked-services/linkctl.toml")]
    pub config: PathBuf,

    /// Overrides `[gateway] base_url`
    #[arg(long, env = "LINKCTL_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all linked services
    List,

    /// Show one service with its recent events
    Show { id: String },

    /// Run a connection test (database services only)
    Test { id: String },

    /// Delete a service
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Create a service
    Add {
        #[command(subcommand)]
        kind: AddCommands,
    },

    /// Refresh periodically and log changes until interrupted
    Watch,
}

#[derive(Debug, Args)]
pub struct Common {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Subcommand)]
pub enum AddCommands {
    /// SQL Server database
    Db {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        server: String,
        #[arg(long)]
        database: String,
        /// Use SQL authentication with this login instead of Windows authentication
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, env = "LINKCTL_DB_PASSWORD")]
        password: Option<String>,
        #[arg(long)]
        trust_server_certificate: bool,
    },

    /// AI provider API key
    Ai {
        #[command(flatten)]
        common: Common,
        #[arg(long, env = "LINKCTL_AI_API_KEY")]
        api_key: String,
    },

    /// Uploaded CSV, Excel, JSON or XML file
    File {
        #[command(flatten)]
        common: Common,
        path: PathBuf,
        /// Column delimiter for CSV and Excel sources
        #[arg(long)]
        delimiter: Option<String>,
        /// Treat the first row as data
        #[arg(long)]
        no_header: bool,
    },
}
