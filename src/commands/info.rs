use super::{SubCommand, Target};
use async_trait::async_trait;
use clap::Args;
use pmm_postgresql::get_info;

#[derive(Args)]
pub struct InfoCommand {}

#[async_trait]
impl SubCommand for InfoCommand {
    async fn execute(&self, target: &Target) -> Result<(), anyhow::Error> {
        let db = target.handle().await?;
        let info = get_info(&target.ctx, &db).await?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        Ok(())
    }
}
