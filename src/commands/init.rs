use super::{SubCommand, Target};
use async_trait::async_trait;
use clap::Args;
use log::info;
use pmm_postgresql::plugin::{init, Flags};
use pmm_postgresql::{Handle, PgHandle};

#[derive(Args)]
pub struct InitCommand {
    /// provision a dedicated monitoring role
    #[arg(long = "create-user")]
    create_user: bool,
    #[arg(long = "user", short = 'u')]
    user: Option<String>,
    #[arg(long = "password", short = 'p')]
    password: Option<String>,
}

#[async_trait]
impl SubCommand for InitCommand {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error> {
        let create_user = self.create_user || target.cfg.create_user;
        let flags = Flags {
            create_user,
            create_user_name: self.user.clone().unwrap_or_else(|| target.cfg.user.clone()),
            create_user_password: self.password.clone().or_else(|| {
                if create_user {
                    target.cfg.user_password.clone()
                } else {
                    None
                }
            }),
        };

        let db = target.handle().await?;
        let registration = init(&target.ctx, &db, &target.dsn, &flags).await?;

        // the role we report must be able to log in
        if registration.dsn != target.dsn {
            let monitor = target
                .ctx
                .run(PgHandle::connect(&registration.dsn, 1))
                .await?;
            target.ctx.run(monitor.fetch_rows("SELECT 1", &[])).await?;
            info!("verified login as {}", registration.dsn.user);
        }

        if registration.user_created {
            println!("created role {}", registration.dsn.user);
            println!("{}", registration.dsn.to_url_string());
        }
        println!("{}", serde_json::to_string_pretty(&registration)?);
        Ok(())
    }
}
