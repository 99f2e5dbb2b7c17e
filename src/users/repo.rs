use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::pagination::SortSpec;

/// User record in the database. The password hash never leaves the repo
/// layer except for credential checks.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User row joined with its role, as served by fetch/list endpoints.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithRole {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
    pub role_description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Minimal identity row resolved by the authorization guard on every
/// authenticated request.
#[derive(Debug, Clone, FromRow)]
pub struct AuthRecord {
    pub id: i32,
    pub email: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role_id, created_at, updated_at";

const JOINED_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.email, u.password_hash, \
     u.role_id, r.name AS role_name, r.description AS role_description, \
     u.created_at, u.updated_at";

impl User {
    pub async fn find_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserWithRole>, sqlx::Error> {
        sqlx::query_as::<_, UserWithRole>(&format!(
            "SELECT {} FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE u.email = $1",
            JOINED_COLUMNS
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<UserWithRole>, sqlx::Error> {
        sqlx::query_as::<_, UserWithRole>(&format!(
            "SELECT {} FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE u.id = $1",
            JOINED_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_auth_record(
        db: &PgPool,
        id: i32,
    ) -> Result<Option<AuthRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuthRecord>(
            "SELECT u.id, u.email, u.role_id, r.name AS role_name
             FROM users u LEFT JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        password_hash: &str,
        role_id: i32,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(db)
        .await
    }

    pub async fn list(
        db: &PgPool,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UserWithRole>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM users u LEFT JOIN roles r ON r.id = u.role_id
             ORDER BY u.{} {} LIMIT $1 OFFSET $2",
            JOINED_COLUMNS, sort.column, sort.direction
        );
        sqlx::query_as::<_, UserWithRole>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(db)
            .await
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
    }

    pub async fn update_profile(
        db: &PgPool,
        id: i32,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role_id: Option<i32>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 role_id = COALESCE($4, role_id),
                 updated_at = now()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(role_id)
        .fetch_optional(db)
        .await
    }

    pub async fn update_password(
        db: &PgPool,
        id: i32,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(db: &PgPool, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
