use super::{SubCommand, Target};
use async_trait::async_trait;
use clap::Args;
use pmm_postgresql::make_grants;

#[derive(Args)]
pub struct PlanCommand {
    /// role to plan for, defaults to the dsn user
    #[arg(long = "user", short = 'u', requires = "password")]
    user: Option<String>,
    #[arg(long = "password", short = 'p', requires = "user")]
    password: Option<String>,
}

#[async_trait]
impl SubCommand for PlanCommand {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error> {
        let db = target.handle().await?;
        let dsn = match &self.user {
            Some(user) => target
                .dsn
                .with_credentials(user, self.password.as_deref().unwrap_or_default()),
            None => target.dsn.clone(),
        };
        let plan = make_grants(&target.ctx, &db, &dsn).await?;
        if plan.is_empty() {
            println!("role {} already exists", dsn.user);
        }
        for exec in &plan {
            println!("{}", serde_json::to_string(exec)?);
        }
        Ok(())
    }
}
