use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::pagination::SortSpec;

/// Expense row joined with its category.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseWithCategory {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub category_name: String,
    pub category_description: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One bucket of the grouped totals (a day, month or year label).
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRow {
    pub period: String,
    pub total: f64,
}

/// Per-category totals for one user.
#[derive(Debug, Clone, FromRow)]
pub struct CategorySummaryRow {
    pub category: String,
    pub total: f64,
}

const JOINED_COLUMNS: &str = "e.id, e.user_id, e.category_id, c.name AS category_name, \
     c.description AS category_description, e.amount, e.description, e.date, \
     e.created_at, e.updated_at";

pub struct Expense;

impl Expense {
    pub async fn find_by_id(
        db: &PgPool,
        id: i32,
    ) -> Result<Option<ExpenseWithCategory>, sqlx::Error> {
        sqlx::query_as::<_, ExpenseWithCategory>(&format!(
            "SELECT {} FROM expenses e JOIN categories c ON c.id = e.category_id WHERE e.id = $1",
            JOINED_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: i32,
        category_id: i32,
        amount: f64,
        description: Option<&str>,
        date: OffsetDateTime,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO expenses (user_id, category_id, amount, description, date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(category_id)
        .bind(amount)
        .bind(description)
        .bind(date)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: i32,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ExpenseWithCategory>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM expenses e JOIN categories c ON c.id = e.category_id
             WHERE e.user_id = $1
             ORDER BY e.{} {} LIMIT $2 OFFSET $3",
            JOINED_COLUMNS, sort.column, sort.direction
        );
        sqlx::query_as::<_, ExpenseWithCategory>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(db)
            .await
    }

    pub async fn count_by_user(db: &PgPool, user_id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expenses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: i32,
        category_id: Option<i32>,
        amount: Option<f64>,
        description: Option<&str>,
        date: Option<OffsetDateTime>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE expenses
             SET category_id = COALESCE($2, category_id),
                 amount = COALESCE($3, amount),
                 description = COALESCE($4, description),
                 date = COALESCE($5, date),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(category_id)
        .bind(amount)
        .bind(description)
        .bind(date)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(db: &PgPool, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Day-by-day totals for the current month.
    pub async fn totals_by_day(db: &PgPool, user_id: i32) -> Result<Vec<SummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, SummaryRow>(
            "SELECT to_char(date, 'YYYY-MM-DD') AS period, SUM(amount) AS total
             FROM expenses
             WHERE user_id = $1
               AND date >= date_trunc('month', now())
               AND date < date_trunc('month', now()) + interval '1 month'
             GROUP BY period
             ORDER BY period",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Month-by-month totals for the current year.
    pub async fn totals_by_month(
        db: &PgPool,
        user_id: i32,
    ) -> Result<Vec<SummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, SummaryRow>(
            "SELECT to_char(date, 'YYYY-MM') AS period, SUM(amount) AS total
             FROM expenses
             WHERE user_id = $1
               AND date >= date_trunc('year', now())
               AND date < date_trunc('year', now()) + interval '1 year'
             GROUP BY period
             ORDER BY period",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Yearly totals over the last five years.
    pub async fn totals_by_year(
        db: &PgPool,
        user_id: i32,
    ) -> Result<Vec<SummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, SummaryRow>(
            "SELECT to_char(date, 'YYYY') AS period, SUM(amount) AS total
             FROM expenses
             WHERE user_id = $1
               AND date >= date_trunc('year', now()) - interval '4 years'
             GROUP BY period
             ORDER BY period",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn totals_by_category(
        db: &PgPool,
        user_id: i32,
    ) -> Result<Vec<CategorySummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, CategorySummaryRow>(
            "SELECT c.name AS category, SUM(e.amount) AS total
             FROM expenses e
             JOIN categories c ON c.id = e.category_id
             WHERE e.user_id = $1
             GROUP BY c.name
             ORDER BY total DESC",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
