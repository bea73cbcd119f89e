use super::{SubCommand, Target};
use async_trait::async_trait;
use clap::Args;
use pmm_postgresql::grants::{create_user, generate_password};

#[derive(Args)]
pub struct CreateUserCommand {
    #[arg(long = "user", short = 'u')]
    user: Option<String>,
    /// generated when omitted
    #[arg(long = "password", short = 'p')]
    password: Option<String>,
}

#[async_trait]
impl SubCommand for CreateUserCommand {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error> {
        let user = self.user.clone().unwrap_or_else(|| target.cfg.user.clone());
        let password = self
            .password
            .clone()
            .or_else(|| target.cfg.user_password.clone())
            .unwrap_or_else(generate_password);
        let dsn = target.dsn.with_credentials(&user, &password);

        let db = target.handle().await?;
        if create_user(&target.ctx, &db, &dsn).await? {
            println!("created role {user}");
            println!("{}", dsn.to_url_string());
        } else {
            println!("role {user} already exists");
        }
        Ok(())
    }
}
