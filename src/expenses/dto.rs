use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::categories::dto::CategoryResponse;
use crate::error::ApiError;
use crate::expenses::repo::{CategorySummaryRow, ExpenseWithCategory, SummaryRow};

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub user_id: i32,
    pub category_id: i32,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category_id: Option<i32>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: i32,
    pub user_id: i32,
    pub category: CategoryResponse,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ExpenseWithCategory> for ExpenseResponse {
    fn from(e: ExpenseWithCategory) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            category: CategoryResponse {
                id: e.category_id,
                name: e.category_name,
                description: e.category_description,
            },
            amount: e.amount,
            description: e.description,
            date: e.date,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryEntry {
    pub period: String,
    pub total: f64,
}

impl From<SummaryRow> for SummaryEntry {
    fn from(r: SummaryRow) -> Self {
        Self {
            period: r.period,
            total: r.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategorySummaryEntry {
    pub category: String,
    pub total: f64,
}

impl From<CategorySummaryRow> for CategorySummaryEntry {
    fn from(r: CategorySummaryRow) -> Self {
        Self {
            category: r.category,
            total: r.total,
        }
    }
}

/// Aggregation window for the expense summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Date,
    Month,
    Year,
}

impl TimeFrame {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "date" => Ok(TimeFrame::Date),
            "month" => Ok(TimeFrame::Month),
            "year" => Ok(TimeFrame::Year),
            _ => Err(ApiError::validation("The specified time frame is invalid.")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub time_frame: String,
}

pub fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::validation("Amount must be greater than 0"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ApiError> {
    let len = description.chars().count();
    if len < 2 || len > 40 {
        return Err(ApiError::validation(
            "Description must be between 2 and 40 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_frame_parsing() {
        assert_eq!(TimeFrame::parse("date").unwrap(), TimeFrame::Date);
        assert_eq!(TimeFrame::parse("month").unwrap(), TimeFrame::Month);
        assert_eq!(TimeFrame::parse("year").unwrap(), TimeFrame::Year);
        assert!(TimeFrame::parse("week").is_err());
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        assert!(validate_amount(12.5).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-3.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn description_length_bounds() {
        assert!(validate_description("groceries").is_ok());
        assert!(validate_description("x").is_err());
        assert!(validate_description(&"x".repeat(41)).is_err());
    }
}
