//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Bring up a self-hosted n8n stack and provision its owner account
#[derive(Parser)]
#[command(
    name = "n8n-deploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Deployment directory holding docker-compose.yml and nginx/
    #[arg(long, global = true, env = "N8N_DEPLOY_DIR", default_value = ".")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the deployment bundle (compose file, nginx config, guide)
    Init(commands::init::InitArgs),

    /// Check prerequisites and (re)start the stack
    Up,

    /// Stop the stack
    Down,

    /// Show container status
    Status,

    /// Show container logs
    Logs(commands::logs::LogsArgs),

    /// Create the n8n owner account
    Provision(commands::provision::ProvisionArgs),

    /// Log in as the owner
    Login(commands::login::LoginArgs),

    /// Run the auto-login reverse proxy
    Proxy(commands::proxy::ProxyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Diagnose the deployment
    Doctor,

    /// Show version
    Version,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Command::Proxy(_) => "info",
            _ => "warn",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            dir,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            dir,
        });
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
            Command::Init(args) => commands::init::run(&app, &args),
            Command::Up => commands::up::run(&app).await,
            Command::Down => commands::down::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Logs(args) => commands::logs::run(&app, args).await,
            Command::Provision(args) => commands::provision::run(&app, args).await,
            Command::Login(args) => commands::login::run(&app, args).await,
            Command::Proxy(args) => commands::proxy::run(args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Doctor => commands::doctor::run(&app).await,
        }
    }
}
