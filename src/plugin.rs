//! Onboarding: optionally provision the monitoring role, then probe the instance.
use crate::context::Context;
use crate::db::Handle;
use crate::dsn::Dsn;
use crate::errors::PluginError;
use crate::grants::{create_user, generate_password};
use crate::info::{get_info, InstanceInfo};
use serde::Serialize;

pub const DEFAULT_USER: &str = "pmm";

#[derive(Clone, Debug)]
pub struct Flags {
    pub create_user: bool,
    pub create_user_name: String,
    /// generated when not set
    pub create_user_password: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            create_user: false,
            create_user_name: DEFAULT_USER.to_owned(),
            create_user_password: None,
        }
    }
}

/// What the caller hands to the registration client.
#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    pub info: InstanceInfo,
    /// connection the agent should monitor with; password redacted when serialized
    #[serde(serialize_with = "redacted")]
    pub dsn: Dsn,
    pub user_created: bool,
}

fn redacted<S: serde::Serializer>(dsn: &Dsn, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(dsn)
}

pub async fn init(
    ctx: &Context,
    db: &dyn Handle,
    dsn: &Dsn,
    flags: &Flags,
) -> Result<Registration, PluginError> {
    if flags.create_user_password.is_some() && !flags.create_user {
        return Err(PluginError::InvalidFlags(
            "a user password only makes sense together with create-user".to_owned(),
        ));
    }
    if flags.create_user && flags.create_user_name.is_empty() {
        return Err(PluginError::InvalidFlags("empty user name".to_owned()));
    }

    let (target, user_created) = if flags.create_user {
        let generated = flags.create_user_password.is_none();
        let password = flags
            .create_user_password
            .clone()
            .unwrap_or_else(generate_password);
        let target = dsn.with_credentials(&flags.create_user_name, &password);
        let created = create_user(ctx, db, &target).await?;
        // an existing role keeps its own password, which we do not know
        if !created && generated {
            return Err(PluginError::InvalidFlags(format!(
                "role {} exists; pass its password",
                flags.create_user_name
            )));
        }
        (target, created)
    } else {
        (dsn.clone(), false)
    };

    let info = get_info(ctx, db).await?;
    Ok(Registration {
        info,
        dsn: target,
        user_created,
    })
}
