//! Example demonstrating the pooled unit-of-work runner against MySQL
//!
//! Needs a reachable MySQL server configured through the `DB_*` environment
//! variables (a `.env` file works too).
//!
//! Run with: cargo run -p smp_infra --example unit_of_work_demo

use smp_core::errors::{DataAccessError, DataAccessResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let db = smp_infra::database_from_env()?;

    println!("\n=== Health Check ===");
    db.health_check().await?;
    println!("Database is reachable.");

    println!("\n=== Committed Unit of Work ===");
    let inserted = db
        .with_unit_of_work(|session| {
            Box::pin(async move {
                sqlx::query(
                    "CREATE TABLE IF NOT EXISTS demo_products \
                     (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(64) NOT NULL)",
                )
                .execute(session.executor())
                .await
                .map_err(DataAccessError::statement)?;

                let result = sqlx::query("INSERT INTO demo_products (name) VALUES ('desk lamp')")
                    .execute(session.executor())
                    .await
                    .map_err(DataAccessError::statement)?;
                Ok(result.rows_affected())
            })
        })
        .await?;
    println!("Inserted {} row(s), committed on return.", inserted);

    println!("\n=== Rolled-back Unit of Work ===");
    let outcome: DataAccessResult<()> = db
        .with_unit_of_work(|session| {
            Box::pin(async move {
                sqlx::query("INSERT INTO demo_products (name) VALUES ('never visible')")
                    .execute(session.executor())
                    .await
                    .map_err(DataAccessError::statement)?;
                Err(DataAccessError::statement("simulated pricing failure"))
            })
        })
        .await;
    match outcome {
        Err(error) => println!("Unit of work failed as scripted: {}", error),
        Ok(()) => println!("Unexpected commit!"),
    }

    let ghosts: i64 = db
        .with_unit_of_work(|session| {
            Box::pin(async move {
                let row: (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM demo_products WHERE name = 'never visible'",
                )
                .fetch_one(session.executor())
                .await
                .map_err(DataAccessError::statement)?;
                Ok(row.0)
            })
        })
        .await?;
    println!("Rows left behind by the rolled-back insert: {}", ghosts);

    println!("\n=== Pool Statistics ===");
    println!("{}", db.statistics());

    // Clean up
    db.with_unit_of_work(|session| {
        Box::pin(async move {
            sqlx::query("DROP TABLE IF EXISTS demo_products")
                .execute(session.executor())
                .await
                .map_err(DataAccessError::statement)?;
            Ok(())
        })
    })
    .await?;
    db.close().await;

    Ok(())
}
