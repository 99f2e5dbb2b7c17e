use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::pagination::SortSpec;

/// Navigation module exposed to the web client.
#[derive(Debug, Clone, FromRow)]
pub struct Module {
    pub id: i32,
    pub name: String,
    pub link_name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, link_name, description, created_at, updated_at";

impl Module {
    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Module>, sqlx::Error> {
        sqlx::query_as::<_, Module>(&format!("SELECT {} FROM modules WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Matches on either unique column, both of which must stay free.
    pub async fn find_by_name_or_link(
        db: &PgPool,
        name: &str,
        link_name: &str,
    ) -> Result<Option<Module>, sqlx::Error> {
        sqlx::query_as::<_, Module>(&format!(
            "SELECT {} FROM modules WHERE name = $1 OR link_name = $2",
            COLUMNS
        ))
        .bind(name)
        .bind(link_name)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        link_name: &str,
        description: Option<&str>,
    ) -> Result<Module, sqlx::Error> {
        sqlx::query_as::<_, Module>(&format!(
            "INSERT INTO modules (name, link_name, description)
             VALUES ($1, $2, $3)
             RETURNING {}",
            COLUMNS
        ))
        .bind(name)
        .bind(link_name)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn list(
        db: &PgPool,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Module>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM modules ORDER BY {} {} LIMIT $1 OFFSET $2",
            COLUMNS, sort.column, sort.direction
        );
        sqlx::query_as::<_, Module>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(db)
            .await
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM modules")
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: i32,
        name: Option<&str>,
        link_name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Module>, sqlx::Error> {
        sqlx::query_as::<_, Module>(&format!(
            "UPDATE modules
             SET name = COALESCE($2, name),
                 link_name = COALESCE($3, link_name),
                 description = COALESCE($4, description),
                 updated_at = now()
             WHERE id = $1
             RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(link_name)
        .bind(description)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
