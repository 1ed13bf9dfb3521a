use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "planboard")]
#[command(version, about = "Command-line client for the Planboard project-management platform")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Print command results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Client home directory (defaults to $PLANBOARD_HOME or the platform config dir)
    #[arg(long, global = true, env = "PLANBOARD_HOME")]
    pub home: Option<PathBuf>,

    /// Backend API base URL. Overrides environment and planboard.toml.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an access token for later commands
    Login {
        #[arg(long)]
        token: String,
        /// Identity the token belongs to (shown by whoami)
        #[arg(long)]
        subject: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage the active tenant
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },
    /// Work with issues
    Issues {
        #[command(subcommand)]
        command: IssueCommands,
    },
    /// Browse pages
    Pages {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage sprints
    Sprints {
        #[command(subcommand)]
        command: SprintCommands,
    },
    /// Search issues, pages and sprints
    Search {
        query: String,
        /// Restrict to one kind: issue, page, sprint
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Inspect boards and edit their transition rules
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum TenantCommands {
    /// List tenants you belong to
    List,
    /// Select the tenant subsequent commands are scoped to
    Use { tenant_id: String },
    /// Clear the tenant selection
    Clear,
    /// Show the selected tenant
    Show,
    /// Create a new tenant
    Create {
        name: String,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Accept an invitation and select the joined tenant
    Accept { token: String },
}

#[derive(Subcommand, Clone)]
pub enum IssueCommands {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        sprint: Option<uuid::Uuid>,
        #[arg(long)]
        assignee: Option<uuid::Uuid>,
    },
    /// Show one issue by id or key
    Show { issue: String },
    Create {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Move an issue to another status
    Move {
        issue: String,
        status: String,
        /// Check the move against this board's transition rules first
        #[arg(long)]
        board: Option<uuid::Uuid>,
    },
    Delete { issue: String },
}

#[derive(Subcommand, Clone)]
pub enum PageCommands {
    List,
    Show { id: uuid::Uuid },
}

#[derive(Subcommand, Clone)]
pub enum SprintCommands {
    List {
        /// planned, active or completed
        #[arg(long)]
        state: Option<String>,
    },
    Start { id: uuid::Uuid },
    Complete { id: uuid::Uuid },
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    List,
    /// Show the allowed status transitions of a board
    Rules { board: uuid::Uuid },
    /// Allow a transition
    Allow {
        board: uuid::Uuid,
        from: String,
        to: String,
    },
    /// Remove a transition
    Disallow {
        board: uuid::Uuid,
        from: String,
        to: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default planboard.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    planboard::telemetry::init(cli.verbose, cli.json_logs);

    let config = planboard::config::PlanboardConfig::with_cli_args(
        cli.home.clone(),
        cli.verbose,
        cli.base_url.clone(),
    )?;

    match &cli.command {
        Commands::Login { token, subject } => cmd::cmd_login(&config, token, subject.as_deref())?,
        Commands::Logout => cmd::cmd_logout(&config).await?,
        Commands::Whoami => cmd::cmd_whoami(&config, cli.json).await?,
        Commands::Tenant { command } => cmd::cmd_tenant(&config, command.clone(), cli.json).await?,
        Commands::Issues { command } => cmd::cmd_issues(&config, command.clone(), cli.json).await?,
        Commands::Pages { command } => cmd::cmd_pages(&config, command.clone(), cli.json).await?,
        Commands::Sprints { command } => {
            cmd::cmd_sprints(&config, command.clone(), cli.json).await?
        }
        Commands::Search { query, kind, limit } => {
            cmd::cmd_search(&config, query, kind.as_deref(), *limit, cli.json).await?
        }
        Commands::Board { command } => cmd::cmd_board(&config, command.clone(), cli.json).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
