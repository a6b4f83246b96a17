use bugtrack::store::{BugStore, init_schema};
use sqlx::sqlite::SqlitePoolOptions;

/// A store backed by a private in-memory database.
///
/// The pool is pinned to one connection that never expires, since every
/// SQLite `:memory:` connection is its own database.
pub async fn setup_store() -> Result<BugStore, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(BugStore::new(pool))
}
