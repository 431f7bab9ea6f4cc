//! SQLite persistence for summarised stories.
//!
//! One table, `news`, keyed by title. [`NewsRepository::insert_many`] writes a
//! whole batch in a single transaction: either every row lands or none do.

use crate::error::Result;
use crate::models::NewsRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news (
        title TEXT PRIMARY KEY NOT NULL,
        category TEXT NOT NULL,
        summary TEXT NOT NULL,
        full_story TEXT NOT NULL,
        byline TEXT,
        reporter_title TEXT
    )
    "#,
];

const UPSERT: &str = r#"
    INSERT INTO news (title, category, summary, full_story, byline, reporter_title)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT(title) DO UPDATE SET
        category = excluded.category,
        summary = excluded.summary,
        full_story = excluded.full_story,
        byline = excluded.byline,
        reporter_title = excluded.reporter_title
"#;

/// Repository over the `news` table.
#[derive(Debug, Clone)]
pub struct NewsRepository {
    pool: SqlitePool,
}

impl NewsRepository {
    /// Connect to `db_url` (e.g. `sqlite://news.db`), creating the database
    /// file and the `news` table if needed.
    #[instrument(level = "info", skip_all)]
    pub async fn connect(db_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        // `:memory:` databases are per-connection; a single connection keeps one database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let repo = Self { pool };
        repo.create_tables().await?;
        info!("Connected to news database");
        Ok(repo)
    }

    async fn create_tables(&self) -> Result<()> {
        for migration in MIGRATIONS {
            sqlx::query(*migration).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Upsert `rows` by title in one transaction and return how many were written.
    ///
    /// Rows with an empty title are skipped. If any write fails the
    /// transaction is dropped uncommitted, which rolls it back.
    #[instrument(level = "info", skip_all, fields(rows = rows.len()))]
    pub async fn insert_many(&self, rows: &[NewsRow]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut count = 0;

        for row in rows {
            if row.title.is_empty() {
                warn!("Skipping row without title");
                continue;
            }
            sqlx::query(UPSERT)
                .bind(&row.title)
                .bind(&row.category)
                .bind(&row.summary)
                .bind(&row.full_story)
                .bind(row.byline.as_deref())
                .bind(row.reporter_title.as_deref())
                .execute(&mut *tx)
                .await?;
            debug!(title = %row.title, "Upserted row");
            count += 1;
        }

        tx.commit().await?;
        info!(count, "Committed news batch");
        Ok(count)
    }

    /// Look up a stored row by its title.
    #[cfg(test)]
    pub async fn get_by_title(&self, title: &str) -> Result<Option<NewsRow>> {
        let row = sqlx::query_as::<_, NewsRow>(
            "SELECT title, category, summary, full_story, byline, reporter_title \
             FROM news WHERE title = ?",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
