pub mod common {
    use async_trait::async_trait;
    use mockall::mock;
    use pmm_postgresql::{Arg, Exec, Handle, PluginError, Row};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    mock! {
        pub Db {}

        #[async_trait]
        impl Handle for Db {
            async fn fetch_rows(&self, query: &str, args: &[Arg]) -> Result<Vec<Row>, PluginError>;
            async fn execute(&self, exec: &Exec) -> Result<u64, PluginError>;
        }
    }

    pub fn ident(v: &str) -> Arg {
        Arg::Ident(v.to_owned())
    }

    pub fn row(values: &[&str]) -> Row {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    pub fn db_error(msg: &str) -> PluginError {
        PluginError::DbError(sqlx::Error::Protocol(msg.to_owned()))
    }

    /// Every statement takes `delay` to run; reads return no rows.
    pub struct SlowDb {
        pub delay: Duration,
        pub executed: AtomicUsize,
    }

    impl SlowDb {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                executed: AtomicUsize::new(0),
            }
        }

        pub fn executed(&self) -> usize {
            self.executed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Handle for SlowDb {
        async fn fetch_rows(&self, _query: &str, _args: &[Arg]) -> Result<Vec<Row>, PluginError> {
            Ok(vec![])
        }

        async fn execute(&self, _exec: &Exec) -> Result<u64, PluginError> {
            tokio::time::sleep(self.delay).await;
            self.executed.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }
}
