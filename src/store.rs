use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Bug, BugChanges, BugDraft};

const BUG_COLUMNS: &str =
    "id, title, description, status, priority, reporter, created_at, updated_at";

/// Creates the `bugs` table if it is missing.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS bugs (
            id TEXT PRIMARY KEY,
            title VARCHAR(100) NOT NULL,
            description VARCHAR(500) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'open',
            priority VARCHAR(20) NOT NULL DEFAULT 'medium',
            reporter VARCHAR(50) NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
    ",
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct BugRow {
    id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    reporter: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BugRow> for Bug {
    type Error = sqlx::Error;

    fn try_from(row: BugRow) -> Result<Self, Self::Error> {
        Ok(Bug {
            id: Uuid::parse_str(&row.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            title: row.title,
            description: row.description,
            status: row
                .status
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            priority: row
                .priority
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            reporter: row.reporter,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The bug collection. Every method is a single SQL statement.
#[derive(Clone)]
pub struct BugStore {
    pool: SqlitePool,
}

impl BugStore {
    pub fn new(pool: SqlitePool) -> Self {
        BugStore { pool }
    }

    /// All bugs in insertion order.
    pub async fn find_all(&self) -> Result<Vec<Bug>, sqlx::Error> {
        sqlx::query_as::<_, BugRow>(&format!("SELECT {BUG_COLUMNS} FROM bugs ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Bug::try_from)
            .collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, sqlx::Error> {
        sqlx::query_as::<_, BugRow>(&format!("SELECT {BUG_COLUMNS} FROM bugs WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Bug::try_from)
            .transpose()
    }

    /// Inserts a new bug under a fresh id, stamped with `now` for both
    /// timestamps.
    pub async fn insert(&self, draft: &BugDraft, now: DateTime<Utc>) -> Result<Bug, sqlx::Error> {
        let id = Uuid::new_v4();
        let row = sqlx::query_as::<_, BugRow>(&format!(
            "INSERT INTO bugs ({BUG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BUG_COLUMNS}"
        ))
        .bind(id.to_string())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.status.as_str())
        .bind(draft.priority.as_str())
        .bind(&draft.reporter)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        debug!("inserted bug {id}");
        Bug::try_from(row)
    }

    /// Writes only the fields set in `changes`, plus `updated_at`. Returns
    /// `None` when no bug has that id.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        changes: &BugChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Bug>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE bugs SET updated_at = ");
        query.push_bind(updated_at);
        if let Some(title) = &changes.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = changes.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(priority) = changes.priority {
            query.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(reporter) = &changes.reporter {
            query.push(", reporter = ").push_bind(reporter.clone());
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(format!(" RETURNING {BUG_COLUMNS}"));

        query
            .build_query_as::<BugRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Bug::try_from)
            .transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM bugs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
