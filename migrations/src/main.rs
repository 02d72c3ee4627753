use anyhow::{bail, Context};
use sea_orm_migration::prelude::*;
use std::env;

use migration::Migrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("up");

    let db = sea_orm::Database::connect(&db_url)
        .await
        .context("Failed to connect to database")?;

    match command {
        "up" => {
            Migrator::up(&db, None).await.context("Failed to run migrations")?;
            println!("✓ Migrations applied successfully");
        }
        "down" => {
            Migrator::down(&db, None)
                .await
                .context("Failed to rollback migration")?;
            println!("✓ Migration rolled back successfully");
        }
        "fresh" => {
            Migrator::fresh(&db)
                .await
                .context("Failed to run fresh migrations")?;
            println!("✓ Fresh migrations applied successfully");
        }
        "status" => {
            Migrator::status(&db)
                .await
                .context("Failed to get migration status")?;
        }
        _ => bail!("Unknown command: {}. Use: up, down, fresh, or status", command),
    }

    Ok(())
}
