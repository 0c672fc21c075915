//! Database migrations.
//!
//! Each service owns its own Postgres schema: `comments`, `posts` and `likes`.
//! The `users` schema belongs to the user service and is only read here.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_comments_table;
mod m20250101_000002_create_posts_tables;
mod m20250101_000003_create_likes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_comments_table::Migration),
            Box::new(m20250101_000002_create_posts_tables::Migration),
            Box::new(m20250101_000003_create_likes_table::Migration),
        ]
    }
}

async fn create_schema(manager: &SchemaManager<'_>, schema: &str) -> Result<(), DbErr> {
    manager
        .get_connection()
        .execute_unprepared(&format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""))
        .await?;
    Ok(())
}
