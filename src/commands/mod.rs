use async_trait::async_trait;
use pmm_postgresql::config::Config;
use pmm_postgresql::{Context, Dsn, PgHandle, PluginError};

pub mod create_user;
pub mod info;
pub mod init;
pub mod plan;

/// Everything a subcommand needs to reach the instance.
pub struct Target {
    pub ctx: Context,
    pub dsn: Dsn,
    pub cfg: Config,
}

impl Target {
    pub async fn handle(&self) -> Result<PgHandle, PluginError> {
        self.ctx
            .run(PgHandle::connect(&self.dsn, self.cfg.max_connections))
            .await
    }
}

#[async_trait]
pub trait SubCommand {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error>;
}
