//! Username lookups against the identity service's `users.profiles` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbConn, Statement, Value};
use uuid::Uuid;

use agora_core::error::RepoError;
use agora_core::ports::UserDirectory;

use super::postgres_base::retry_read;

/// Reads display names from the shared profiles table.
///
/// Can point at the main connection or at a secondary named `users`.
pub struct PostgresUserDirectory {
    db: DbConn,
}

impl PostgresUserDirectory {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn profiles_query(user_ids: &[Uuid]) -> Statement {
    let placeholders: Vec<String> = (1..=user_ids.len()).map(|i| format!("${i}")).collect();
    let sql = format!(
        r#"SELECT "user_id", "username" FROM "users"."profiles" WHERE "user_id" IN ({})"#,
        placeholders.join(", ")
    );
    let values: Vec<Value> = user_ids.iter().map(|id| (*id).into()).collect();
    Statement::from_sql_and_values(sea_orm::DatabaseBackend::Postgres, sql, values)
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = retry_read(|| self.db.query_all(profiles_query(user_ids))).await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let user_id: Uuid = row
                .try_get("", "user_id")
                .map_err(|e| RepoError::Query(e.to_string()))?;
            let username: String = row
                .try_get("", "username")
                .map_err(|e| RepoError::Query(e.to_string()))?;
            names.insert(user_id, username);
        }
        Ok(names)
    }
}
