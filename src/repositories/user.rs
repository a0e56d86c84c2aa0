use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::user::UserRecord,
};

/// Persistence for user records, keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with [`AppError::DuplicateUser`] when the
    /// email is already registered.
    async fn create(&self, email: &str, password_hash: &str, name: &str) -> Result<UserRecord>;

    /// Finds the single user registered under `email`.
    ///
    /// More than one match is an [`AppError::Integrity`] error.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
}

/// Collapses a lookup result into at most one record.
pub(crate) fn single_match(email: &str, mut matches: Vec<UserRecord>) -> Result<Option<UserRecord>> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        n => Err(AppError::Integrity(format!(
            "{} user records share the email {}",
            n, email
        ))),
    }
}

/// A helper function to map a `tokio_postgres::Row` to a `UserRecord`.
fn row_to_user(row: &Row) -> Result<UserRecord> {
    Ok(UserRecord::new(
        row.try_get("id")?,
        row.try_get("email")?,
        row.try_get("password")?,
        row.try_get("name")?,
    ))
}

/// User store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, email: &str, password_hash: &str, name: &str) -> Result<UserRecord> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_opt(
                r#"
                INSERT INTO users (id, email, password, name)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (email) DO NOTHING
                RETURNING id, email, password, name
                "#,
                &[&id, &email, &password_hash, &name],
            )
            .await?
            .ok_or(AppError::DuplicateUser)?;
        row_to_user(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT id, email, password, name
                FROM users
                WHERE email = $1
                LIMIT 2
                "#,
                &[&email],
            )
            .await?;
        let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>>>()?;
        single_match(email, users)
    }
}
