use anyhow::{Context, Result};
use shared::{
    domain::{Category, CategoryId, DisplayPointer, Performer, PerformerId},
    error::{ApiError, ErrorCode},
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite, SqliteConnection, Transaction,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

mod categories;
mod performers;
mod roster;
mod settings;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("category {0} does not exist")]
    InvalidReference(CategoryId),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Maps a unique-constraint violation on write to `Conflict`.
    fn on_write(err: sqlx::Error, conflict: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict(conflict()),
            _ => Self::Storage(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        let code = match &value {
            StoreError::NotFound(_) => ErrorCode::NotFound,
            StoreError::InvalidReference(_) => ErrorCode::InvalidReference,
            StoreError::Conflict(_) => ErrorCode::Conflict,
            StoreError::Validation(_) => ErrorCode::Validation,
            StoreError::Storage(_) => ErrorCode::Internal,
        };
        ApiError::new(code, value.to_string())
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let mut connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if sqlite_path(database_url).is_some() {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply migrations")?;

        let storage = Self { pool };
        storage
            .seed_default_settings()
            .await
            .context("failed to seed default settings")?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Opens a transaction. Dropping the returned unit without `commit` rolls it back.
    pub async fn begin(&self) -> StoreResult<UnitOfWork> {
        Ok(UnitOfWork {
            tx: self.write_tx().await?,
        })
    }

    /// Takes the write lock up front so concurrent writers queue on the busy
    /// timeout instead of failing with `SQLITE_BUSY` on lock upgrade.
    pub(crate) async fn write_tx(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

/// A sequence of reads and writes that either all land or none do.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn category(&mut self, id: CategoryId) -> StoreResult<Option<Category>> {
        categories::fetch(self.conn(), id).await
    }

    pub async fn performer(&mut self, id: PerformerId) -> StoreResult<Option<Performer>> {
        performers::fetch(self.conn(), id).await
    }

    /// Performers of a category, lowest rank first; equal ranks keep insertion order.
    pub async fn performers_in_category(
        &mut self,
        category_id: CategoryId,
    ) -> StoreResult<Vec<Performer>> {
        performers::fetch_by_category(self.conn(), category_id).await
    }

    pub async fn display_pointer(&mut self) -> StoreResult<DisplayPointer> {
        settings::load_pointer(self.conn()).await
    }

    pub async fn save_display_pointer(&mut self, pointer: &DisplayPointer) -> StoreResult<()> {
        settings::save_pointer(self.conn(), pointer).await
    }

    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Where the database lives when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/database.sqlite";

/// Turns a bare file path into a `sqlite://` URL. Other URLs pass through.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return DEFAULT_DATABASE_URL.to_string();
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
