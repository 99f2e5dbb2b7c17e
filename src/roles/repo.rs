use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::pagination::SortSpec;

/// Role record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, description, created_at, updated_at";

impl Role {
    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(&format!("SELECT {} FROM roles WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(&format!("SELECT {} FROM roles WHERE name = $1", COLUMNS))
            .bind(name)
            .fetch_optional(db)
            .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, sqlx::Error> {
        sqlx::query_as::<_, Role>(&format!(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        ))
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn list(
        db: &PgPool,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Role>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM roles ORDER BY {} {} LIMIT $1 OFFSET $2",
            COLUMNS, sort.column, sort.direction
        );
        sqlx::query_as::<_, Role>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(db)
            .await
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles")
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(&format!(
            "UPDATE roles
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 updated_at = now()
             WHERE id = $1
             RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// How many users still reference this role. Deletion is refused while
    /// this is non-zero.
    pub async fn referencing_users(db: &PgPool, id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(id)
            .fetch_one(db)
            .await
    }
}
