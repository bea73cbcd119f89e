mod commands;

use crate::commands::{SubCommand, Target};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use pmm_postgresql::config::Config;
use pmm_postgresql::{Context, Dsn};
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// admin connection url, defaults to DATABASE_URL
    #[arg(long = "dsn", global = true)]
    dsn: Option<String>,
    /// seconds before the command gives up, defaults to PMM_QUERY_TIMEOUT_SEC
    #[arg(long = "timeout", global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: SubCommands,
}

#[derive(Subcommand)]
enum SubCommands {
    Plan(commands::plan::PlanCommand),
    CreateUser(commands::create_user::CreateUserCommand),
    Info(commands::info::InfoCommand),
    Init(commands::init::InitCommand),
}

#[async_trait]
impl SubCommand for SubCommands {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error> {
        match self {
            SubCommands::Plan(cmd) => cmd.execute(target).await,
            SubCommands::CreateUser(cmd) => cmd.execute(target).await,
            SubCommands::Info(cmd) => cmd.execute(target).await,
            SubCommands::Init(cmd) => cmd.execute(target).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = Config::default();

    let dsn = Dsn::parse(cli.dsn.as_deref().unwrap_or(&cfg.database_url))?;
    let timeout = cli.timeout.unwrap_or(cfg.query_timeout_sec);
    let target = Target {
        ctx: Context::with_timeout(Duration::from_secs(timeout)),
        dsn,
        cfg,
    };
    cli.command.execute(&target).await
}
