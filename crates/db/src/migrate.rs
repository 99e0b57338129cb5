//! Idempotent migration runner.
//!
//! Applied migrations are recorded in a ledger table keyed by
//! `(module, id)`. Each pending migration runs in its own transaction
//! together with its ledger row, so a failure leaves nothing half-applied.

use anyhow::Context;
use sqlx::PgPool;

use bookshelf_kernel::Migration;

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS bookshelf_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration not yet present in the ledger.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(LEDGER_DDL)
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

    let mut applied = 0;

    for (module, migration) in migrations {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM bookshelf_migrations WHERE module = $1 AND id = $2)",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_one(pool)
        .await
        .context("failed to read migration ledger")?;

        if exists {
            tracing::debug!(target: "bookshelf-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;

        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query("INSERT INTO bookshelf_migrations (module, id) VALUES ($1, $2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(target: "bookshelf-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_applied_once() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::create_pool(&url).await.expect("pool creation failed");

        let migrations = vec![(
            "ledger_test".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE IF NOT EXISTS ledger_test (id INT);",
            },
        )];

        sqlx::query("DELETE FROM bookshelf_migrations WHERE module = 'ledger_test'")
            .execute(&pool)
            .await
            .ok();

        assert_eq!(run_migrations(&pool, &migrations).await.unwrap(), 1);
        assert_eq!(run_migrations(&pool, &migrations).await.unwrap(), 0);
    }
}
