use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::pagination::SortSpec;

/// Expense category record.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, description, created_at, updated_at";

impl Category {
    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE name = $1",
            COLUMNS
        ))
        .bind(name)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        ))
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await
    }

    /// List with an optional case-insensitive name filter.
    pub async fn list(
        db: &PgPool,
        search: Option<&str>,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM categories
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
             ORDER BY {} {} LIMIT $2 OFFSET $3",
            COLUMNS, sort.column, sort.direction
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(search)
            .bind(limit)
            .bind(skip)
            .fetch_all(db)
            .await
    }

    pub async fn count(db: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories
             WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')",
        )
        .bind(search)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
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
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Expenses still filed under this category. Deletion is refused while
    /// this is non-zero.
    pub async fn referencing_expenses(db: &PgPool, id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expenses WHERE category_id = $1")
            .bind(id)
            .fetch_one(db)
            .await
    }
}
