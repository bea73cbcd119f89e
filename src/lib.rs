//! Onboarding routines for a PostgreSQL instance monitored by the PMM agent:
//! provisioning a restricted monitoring role and reading instance identity.
pub mod config;
pub mod context;
pub mod db;
pub mod dsn;
pub mod errors;
pub mod exec;
pub mod grants;
pub mod info;
pub mod plugin;

pub use context::{CancelHandle, Context};
pub use db::{Handle, PgHandle, Row};
pub use dsn::Dsn;
pub use errors::PluginError;
pub use exec::{Arg, Exec};
pub use grants::{apply_grants, create_user, make_grants};
pub use info::{get_info, InstanceInfo};
pub use plugin::{init, Flags, Registration};
