use crate::dsn::Dsn;
use crate::errors::PluginError;
use crate::exec::{Arg, Exec};
use async_trait::async_trait;
use log::debug;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Executor, Pool, Postgres, Row as _, TypeInfo};

/// One result row, every column rendered as text. SQL NULL is `None`.
pub type Row = Vec<Option<String>>;

/// The database operations the planner and prober need.
#[async_trait]
pub trait Handle: Send + Sync {
    /// Run a read query with `args` bound to its placeholders.
    async fn fetch_rows(&self, query: &str, args: &[Arg]) -> Result<Vec<Row>, PluginError>;

    /// Run a side-effecting statement, returning the number of rows affected.
    async fn execute(&self, exec: &Exec) -> Result<u64, PluginError>;
}

pub async fn connect(dsn: &Dsn, max_connections: u32) -> Result<Pool<Postgres>, PluginError> {
    let pgp = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(10))
        .max_connections(max_connections)
        .connect_with(dsn.connect_options()?)
        .await?;
    Ok(pgp)
}

#[derive(Clone, Debug)]
pub struct PgHandle {
    pub connection: Pool<Postgres>,
}

impl PgHandle {
    pub fn new(connection: Pool<Postgres>) -> Self {
        Self { connection }
    }

    pub async fn connect(dsn: &Dsn, max_connections: u32) -> Result<Self, PluginError> {
        Ok(Self::new(connect(dsn, max_connections).await?))
    }
}

#[async_trait]
impl Handle for PgHandle {
    async fn fetch_rows(&self, query: &str, args: &[Arg]) -> Result<Vec<Row>, PluginError> {
        let rows = if args.is_empty() {
            // simple query protocol: the server sends every column as text
            self.connection.fetch_all(query).await?
        } else {
            let mut q = sqlx::query(query);
            for arg in args {
                q = q.bind(arg.as_str().to_owned());
            }
            q.fetch_all(&self.connection).await?
        };
        rows.iter().map(row_text).collect()
    }

    async fn execute(&self, exec: &Exec) -> Result<u64, PluginError> {
        let sql = exec.render()?;
        debug!("executing {:?}", exec);
        let done = self.connection.execute(sql.as_str()).await?;
        Ok(done.rows_affected())
    }
}

fn row_text(row: &PgRow) -> Result<Row, PluginError> {
    (0..row.len()).map(|i| column_text(row, i)).collect()
}

// Binary-format results only decode for the types matched here; anything else
// is read as text, which holds for text-like columns and simple-protocol rows.
fn column_text(row: &PgRow, idx: usize) -> Result<Option<String>, PluginError> {
    let type_name = row.column(idx).type_info().name().to_owned();
    let value = match type_name.as_str() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(|v| v.to_string()),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| v.to_string()),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| v.to_string()),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(|v| v.to_string()),
        _ => row.try_get_unchecked::<Option<String>, _>(idx)?,
    };
    Ok(value)
}
