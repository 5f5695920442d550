//! Arbiter CLI - admin console for the online judge.
//!
//! Lists and edits roles, permissions and users. Every write is gated behind
//! step-up verification: the operator confirms a one-time code before the
//! backend hands out the single-use token the write must carry.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use arbiter_api::{AdminClient, DEFAULT_PAGE_SIZE, RecordId};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

mod commands;
mod config_bridge;
mod prompt;
mod theme;

use commands::{Console, OutputFormat, config, permissions, roles, users};
use theme::Theme;

/// Arbiter - online judge admin console
#[derive(Parser)]
#[command(name = "arbiter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage roles
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// Manage permissions
    Permissions {
        #[command(subcommand)]
        command: PermissionCommands,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Paging flags shared by every list command.
#[derive(Args)]
struct PagingArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Rows per page (max 100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Search keyword
    #[arg(short, long)]
    keyword: Option<String>,
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List roles
    List {
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Create a role
    Create {
        /// Role name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Permission ids to grant (comma-separated)
        #[arg(short, long = "permission", value_delimiter = ',')]
        permissions: Vec<RecordId>,
    },
    /// Update a role
    Update {
        /// Role id
        id: RecordId,
        /// Role name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Permission ids to grant (comma-separated)
        #[arg(short, long = "permission", value_delimiter = ',')]
        permissions: Vec<RecordId>,
    },
    /// Delete a role
    Delete {
        /// Role id
        id: RecordId,
    },
}

#[derive(Subcommand)]
enum PermissionCommands {
    /// List permissions
    List {
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Create a permission
    Create {
        /// Display name
        name: String,
        /// Permission code, e.g. problem:edit
        code: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update a permission
    Update {
        /// Permission id
        id: RecordId,
        /// Display name
        name: String,
        /// Permission code
        code: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a permission
    Delete {
        /// Permission id
        id: RecordId,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        #[command(flatten)]
        paging: PagingArgs,
        /// Only users holding this role
        #[arg(long)]
        role: Option<RecordId>,
        /// Only active (true) or disabled (false) users
        #[arg(long)]
        active: Option<bool>,
    },
    /// Create a user (prompts for a password)
    Create {
        /// Login name
        username: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Role ids to assign (comma-separated)
        #[arg(short, long = "role", value_delimiter = ',')]
        roles: Vec<RecordId>,
        /// Create the account disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Update a user
    Update {
        /// User id
        id: RecordId,
        /// Login name
        username: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Role ids to assign (comma-separated)
        #[arg(short, long = "role", value_delimiter = ',')]
        roles: Vec<RecordId>,
        /// Enable (true) or disable (false) sign-in
        #[arg(long)]
        active: Option<bool>,
        /// Prompt for a new password
        #[arg(short, long)]
        password: bool,
    },
    /// Delete a user
    Delete {
        /// User id
        id: RecordId,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show,
    /// Show where configuration was read from
    Paths,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let resolved = arbiter_config::Config::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    // Set up logging from config, with --verbose override.
    let mut log_config = config_bridge::to_log_config(&resolved.config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = arbiter_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!(files = ?resolved.loaded_files, env = ?resolved.env_fields, "configuration loaded");

    let format = OutputFormat::parse(&cli.format);

    let command = match cli.command {
        Commands::Config { command } => return config::handle_config(&resolved, &command),
        other => other,
    };

    let cfg = &resolved.config;
    if !cfg.api.has_session_token() {
        eprintln!(
            "{}",
            Theme::warning("No session token configured (set ARBITER_SESSION_TOKEN)")
        );
    }
    let client = AdminClient::new(&config_bridge::to_api_settings(cfg))
        .context("failed to create API client")?;
    let console = Console::new(client, cfg.stepup.max_attempts, format);

    match command {
        Commands::Roles { command } => roles::handle_roles(&console, command).await,
        Commands::Permissions { command } => {
            permissions::handle_permissions(&console, command).await
        },
        Commands::Users { command } => users::handle_users(&console, command).await,
        Commands::Config { .. } => Ok(()),
    }
}
