//! Database layer for SQLite storage.
//!
//! This module handles all database operations including:
//! - Connection pool management with WAL mode
//! - Schema migrations
//! - SQLite implementations of the user, team and pull request directories

pub mod pool;
pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::SqlitePullRequestStore;
pub use teams::SqliteTeamDirectory;
pub use users::SqliteUserDirectory;

use std::path::Path;
use thiserror::Error;

use pool::{DbPool, PoolSettings};

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Embedded migrations, applied in order and recorded by name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Initialize the database with default pool settings.
pub async fn initialize(db_path: &Path) -> Result<DbPool, DbError> {
    initialize_with(db_path, PoolSettings::default()).await
}

/// Initialize the database: create the file and its directory if needed
/// and run pending migrations.
pub async fn initialize_with(db_path: &Path, settings: PoolSettings) -> Result<DbPool, DbError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::Migration(format!("Failed to create database directory: {}", e))
        })?;
    }

    let pool = pool::create_pool(db_path, settings).await?;
    run_migrations(&pool).await?;

    log::info!("[db] Database ready at {}", db_path.display());
    Ok(pool)
}

/// Run all pending database migrations.
async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    for (name, migration_sql) in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        if applied.is_some() {
            continue;
        }

        let statements = parse_sql_statements(migration_sql);
        if statements.is_empty() {
            return Err(DbError::Migration(format!("{} has no statements", name)));
        }

        let mut tx = sqlx::Connection::begin(&mut *conn).await?;
        for statement in statements {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::info!("[db] Applied migration {}", name);
    }

    Ok(())
}

/// Split a migration script into statements.
///
/// `--` comments are dropped. A `;` ends a statement only outside
/// parentheses, so expressions like `strftime('%s', 'now')` stay whole.
fn parse_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for line in sql.lines() {
        let code = line.split("--").next().unwrap_or_default();
        for ch in code.chars() {
            match ch {
                ';' if depth == 0 => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    continue;
                }
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            current.push(ch);
        }
        if !current.trim().is_empty() {
            current.push(' ');
        }
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let statement = raw.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_sql_statements_skips_comments() {
        let sql = "-- header\nCREATE TABLE a (x TEXT DEFAULT (strftime('%s', 'now')));\nCREATE INDEX i ON a(x); -- trailing\n";
        let statements = parse_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert_eq!(statements[1], "CREATE INDEX i ON a(x)");
    }

    #[tokio::test]
    async fn test_initialize_creates_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let pool = initialize(&db_path).await.unwrap();

        // Verify the database file was created
        assert!(db_path.exists());

        // Verify tables were created
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_migrations' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(table_names, vec!["pull_requests", "teams", "users"]);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        // Initialize twice
        let _pool1 = initialize(&db_path).await.unwrap();
        let pool2 = initialize(&db_path).await.unwrap();

        // Should still have exactly one migration record
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool2)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
