use crate::context::Context;
use crate::db::Handle;
use crate::errors::PluginError;
use log::info;
use serde::{Deserialize, Serialize};

pub const DISTRO: &str = "PostgreSQL";
pub const INSTANCE_QUERY: &str = "SELECT inet_server_addr(), inet_server_port(), version()";

/// Identity reported for registration with the monitoring server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub hostname: String,
    pub port: String,
    pub distro: String,
    pub version: String,
}

/// Read the server address, port and version. Read-only.
pub async fn get_info(ctx: &Context, db: &dyn Handle) -> Result<InstanceInfo, PluginError> {
    let rows = ctx.run(db.fetch_rows(INSTANCE_QUERY, &[])).await?;
    let row = match rows.as_slice() {
        [row] => row,
        _ => {
            return Err(PluginError::UnexpectedResult(format!(
                "expected 1 row from instance query, got {}",
                rows.len()
            )))
        }
    };
    let [hostname, port, version] = row.as_slice() else {
        return Err(PluginError::UnexpectedResult(format!(
            "expected 3 columns from instance query, got {}",
            row.len()
        )));
    };
    let (Some(hostname), Some(port), Some(version)) = (hostname, port, version) else {
        return Err(PluginError::UnexpectedResult(
            "instance query returned NULL, is this a unix socket connection?".to_owned(),
        ));
    };

    let info = InstanceInfo {
        hostname: hostname.clone(),
        port: port.clone(),
        distro: DISTRO.to_owned(),
        version: version.clone(),
    };
    info!("probed {} instance at {}:{}", info.distro, info.hostname, info.port);
    Ok(info)
}
