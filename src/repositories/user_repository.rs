// src/repositories/user_repository.rs
use async_trait::async_trait;
use deadpool_postgres::Pool;
use thiserror::Error;
use tokio_postgres::Row;

use crate::models::user::User;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("user not found")]
    NotFound,
}

/// Lookup and update of user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_name(&self, user_name: &str) -> Result<Option<User>, DirectoryError>;

    /// Persist the mutable fields of `user`, matched by id.
    async fn update(&self, user: &User) -> Result<(), DirectoryError>;
}

/// `UserDirectory` backed by the `users` table:
///
/// ```sql
/// create table users (
///     id uuid primary key,
///     user_name text not null unique,
///     has_profile_picture boolean not null default false
/// );
/// ```
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: Pool,
}

impl PgUserDirectory {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        user_name: row.get("user_name"),
        has_profile_picture: row.get("has_profile_picture"),
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_name(&self, user_name: &str) -> Result<Option<User>, DirectoryError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, user_name, has_profile_picture FROM users WHERE user_name = $1",
                &[&user_name],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn update(&self, user: &User) -> Result<(), DirectoryError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE users SET has_profile_picture = $2 WHERE id = $1",
                &[&user.id, &user.has_profile_picture],
            )
            .await?;

        if updated == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}
