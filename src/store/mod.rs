// Repository layer. One submodule per entity, all sharing the pooled
// connection through `Store`. Cascade deletes are explicit here rather
// than delegated to an ORM graph walker.

pub mod comments;
pub mod follows;
pub mod likes;
pub mod notifications;
pub mod posts;
pub mod users;

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppResult;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and create the schema in one step.
    pub async fn open(url: &str) -> AppResult<Self> {
        let pool = db::connect(url).await?;
        db::initialize(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    Store::open("sqlite::memory:")
        .await
        .expect("in-memory store")
}
