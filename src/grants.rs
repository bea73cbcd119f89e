//! Monitoring role provisioning.
//!
//! The plan is plain data: [`make_grants`] only reads `pg_roles`, and
//! [`apply_grants`] is what touches the server. Existence is checked before
//! anything is created, not inside a transaction, so two concurrent runs
//! against the same missing role can both pass the check. The unique role
//! name in `pg_roles` makes the second `CREATE USER` fail.
use crate::context::Context;
use crate::db::Handle;
use crate::dsn::Dsn;
use crate::errors::PluginError;
use crate::exec::{Arg, Exec};
use log::{debug, error, info};
use passwords::PasswordGenerator;

pub const ROLE_EXISTS: &str = "SELECT 1 FROM pg_roles WHERE rolname = $1";

const CREATE_USER: &str = "CREATE USER $1 PASSWORD $2";
const SET_SEARCH_PATH: &str = "ALTER USER $1 SET SEARCH_PATH TO $1,pg_catalog";
const CREATE_SCHEMA: &str = "CREATE SCHEMA $1 AUTHORIZATION $1";
const CREATE_ACTIVITY_VIEW: &str =
    "CREATE VIEW $1.pg_stat_activity AS SELECT * from pg_catalog.pg_stat_activity";
const GRANT_ACTIVITY_VIEW: &str = "GRANT SELECT $1.pg_stat_activity TO $1";
const CREATE_REPLICATION_VIEW: &str =
    "CREATE VIEW $1.pg_stat_replication AS SELECT * from pg_catalog.pg_stat_replication";
const GRANT_REPLICATION_VIEW: &str = "GRANT SELECT ON $1.pg_stat_replication TO $1";

/// Statements needed to provision `dsn.user`, or an empty plan when the role
/// already exists.
pub async fn make_grants(
    ctx: &Context,
    db: &dyn Handle,
    dsn: &Dsn,
) -> Result<Vec<Exec>, PluginError> {
    debug!("checking for role {}", dsn.user);
    let rows = ctx
        .run(db.fetch_rows(ROLE_EXISTS, &[Arg::Text(dsn.user.clone())]))
        .await?;
    if !rows.is_empty() {
        info!("role {} already exists, nothing to grant", dsn.user);
        return Ok(vec![]);
    }
    Ok(grant_plan(&dsn.user, &dsn.password))
}

/// The fixed provisioning sequence for a role that does not exist yet.
pub fn grant_plan(user: &str, password: &str) -> Vec<Exec> {
    let role = || vec![Arg::Ident(user.to_owned())];
    vec![
        Exec::new(
            CREATE_USER,
            vec![Arg::Ident(user.to_owned()), Arg::Secret(password.to_owned())],
        ),
        Exec::new(SET_SEARCH_PATH, role()),
        Exec::new(CREATE_SCHEMA, role()),
        Exec::new(CREATE_ACTIVITY_VIEW, role()),
        Exec::new(GRANT_ACTIVITY_VIEW, role()),
        Exec::new(CREATE_REPLICATION_VIEW, role()),
        Exec::new(GRANT_REPLICATION_VIEW, role()),
    ]
}

/// Execute `plan` in order, stopping at the first failure. Statements that
/// already ran are not undone.
pub async fn apply_grants(
    ctx: &Context,
    db: &dyn Handle,
    plan: &[Exec],
) -> Result<(), PluginError> {
    for (i, exec) in plan.iter().enumerate() {
        debug!("grant {}/{}: {:?}", i + 1, plan.len(), exec);
        if let Err(e) = ctx.run(db.execute(exec)).await {
            error!("grant {} failed: {}", i + 1, e);
            return Err(PluginError::Statement {
                index: i + 1,
                source: Box::new(e),
            });
        }
    }
    Ok(())
}

/// Provision the role in `dsn` if it is missing. Returns whether it was created.
pub async fn create_user(ctx: &Context, db: &dyn Handle, dsn: &Dsn) -> Result<bool, PluginError> {
    let plan = make_grants(ctx, db, dsn).await?;
    if plan.is_empty() {
        return Ok(false);
    }
    apply_grants(ctx, db, &plan).await?;
    info!("created role {} with schema {}", dsn.user, dsn.user);
    Ok(true)
}

pub fn generate_password() -> String {
    let pg = PasswordGenerator {
        length: 20,
        numbers: true,
        lowercase_letters: true,
        uppercase_letters: true,
        symbols: false,
        spaces: false,
        exclude_similar_characters: false,
        strict: true,
    };
    // only fails for an all-false generator
    pg.generate_one().unwrap_or_default()
}
