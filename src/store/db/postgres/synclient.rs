use std::{future::Future, sync::Arc, time::Duration};

use sqlx::{
    Database, Error, IntoArguments, PgPool, Postgres,
    postgres::{PgPoolOptions, PgRow},
};
use tokio::{
    runtime::{Handle, Runtime},
    task::block_in_place,
};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 32;

/// Blocking facade over an sqlx pool, driven by the provisioner's runtime.
#[derive(Debug, Clone)]
pub struct SynClient {
    pool: PgPool,

    runtime: Arc<Runtime>,
}

/// Runs `fut` to completion, stepping out of the async context first when called from a worker thread.
fn block_on<F: Future>(
    runtime: &Runtime,
    fut: F,
) -> F::Output {
    if Handle::try_current().is_ok() {
        block_in_place(|| runtime.block_on(fut))
    } else {
        runtime.block_on(fut)
    }
}

impl SynClient {
    pub fn connect(
        db_url: &str,
        runtime: Arc<Runtime>,
    ) -> Result<Self, Error> {
        let pool = block_on(&runtime, PgPoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT).max_connections(MAX_CONNECTIONS).connect(db_url))?;

        Ok(Self {
            pool,
            runtime,
        })
    }

    pub fn query_one<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> Result<PgRow, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        block_on(&self.runtime, async move { sqlx::query_with(sql, params).fetch_one(&self.pool).await })
    }

    pub fn query<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> Result<Vec<PgRow>, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        block_on(&self.runtime, async move { sqlx::query_with(sql, params).fetch_all(&self.pool).await })
    }

    pub fn execute<'q, A>(
        &self,
        sql: &'q str,
        params: A,
    ) -> Result<<Postgres as Database>::QueryResult, Error>
    where
        A: IntoArguments<'q, Postgres> + 'q,
    {
        block_on(&self.runtime, async move { sqlx::query_with(sql, params).execute(&self.pool).await })
    }

    /// Executes every statement in one transaction.
    pub fn batch_execute(
        &self,
        sqls: &[String],
    ) -> Result<(), Error> {
        block_on(&self.runtime, async move {
            let mut tx = self.pool.begin().await?;

            for sql in sqls {
                sqlx::query(sql).execute(&mut *tx).await?;
            }
            tx.commit().await
        })
    }
}
