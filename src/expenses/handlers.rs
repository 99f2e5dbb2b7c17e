use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::auth::extractors::AuthUser;
use crate::categories::repo::Category;
use crate::error::ApiError;
use crate::expenses::dto::{
    validate_amount, validate_description, CategorySummaryEntry, CreateExpenseRequest,
    ExpenseResponse, SummaryEntry, SummaryParams, TimeFrame, UpdateExpenseRequest,
};
use crate::expenses::repo::Expense;
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::users::repo::User;

const SORT_FIELDS: &[&str] = &["amount", "date", "created_at"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expense", post(create_expense))
        .route("/expense/user/:user_id", get(list_expenses))
        .route("/expense/:id", put(update_expense).delete(delete_expense))
        .route("/expense/summary/:user_id", get(expense_summary))
        .route("/expense/category_summary/:user_id", get(category_summary))
}

#[instrument(skip(state, payload))]
async fn create_expense(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    validate_amount(payload.amount)?;
    if let Some(description) = payload.description.as_deref() {
        validate_description(description)?;
    }

    // Both referenced rows must exist before the insert.
    if User::find_by_id(&state.db, payload.user_id).await?.is_none() {
        return Err(ApiError::validation("User does not exist."));
    }
    if Category::find_by_id(&state.db, payload.category_id)
        .await?
        .is_none()
    {
        return Err(ApiError::validation("Category does not exist."));
    }

    let id = Expense::create(
        &state.db,
        payload.user_id,
        payload.category_id,
        payload.amount,
        payload.description.as_deref(),
        payload.date,
    )
    .await?;

    let expense = Expense::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("freshly created expense vanished"))?;

    info!(expense_id = id, actor = actor.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense.into())))
}

#[instrument(skip(state))]
async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<i32>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ExpenseResponse>>, ApiError> {
    let sort = params.sort_spec(SORT_FIELDS)?;

    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::not_found("User does not exist."));
    }

    let total = Expense::count_by_user(&state.db, user_id).await?;
    let expenses =
        Expense::list_by_user(&state.db, user_id, sort, params.skip, params.limit).await?;
    let items = expenses.into_iter().map(ExpenseResponse::from).collect();
    Ok(Json(Page::new(total, &params, items)))
}

#[instrument(skip(state, payload))]
async fn update_expense(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    if let Some(amount) = payload.amount {
        validate_amount(amount)?;
    }
    if let Some(description) = payload.description.as_deref() {
        validate_description(description)?;
    }
    if let Some(category_id) = payload.category_id {
        if Category::find_by_id(&state.db, category_id).await?.is_none() {
            return Err(ApiError::validation("Category does not exist."));
        }
    }

    let updated = Expense::update(
        &state.db,
        id,
        payload.category_id,
        payload.amount,
        payload.description.as_deref(),
        payload.date,
    )
    .await?;
    if updated == 0 {
        return Err(ApiError::not_found("Expense does not exist."));
    }

    let expense = Expense::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense does not exist."))?;

    info!(expense_id = id, actor = actor.id, "expense updated");
    Ok(Json(expense.into()))
}

#[instrument(skip(state))]
async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let deleted = Expense::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Expense does not exist."));
    }
    info!(expense_id = id, actor = actor.id, "expense deleted");
    Ok(Json(json!({ "message": "Expense has been deleted successfully." })))
}

/// Totals bucketed by day of the current month, month of the current year,
/// or the last five years, depending on `time_frame`.
#[instrument(skip(state))]
async fn expense_summary(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<i32>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<SummaryEntry>>, ApiError> {
    let time_frame = TimeFrame::parse(&params.time_frame)?;

    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::not_found("User does not exist."));
    }

    let rows = match time_frame {
        TimeFrame::Date => Expense::totals_by_day(&state.db, user_id).await?,
        TimeFrame::Month => Expense::totals_by_month(&state.db, user_id).await?,
        TimeFrame::Year => Expense::totals_by_year(&state.db, user_id).await?,
    };
    Ok(Json(rows.into_iter().map(SummaryEntry::from).collect()))
}

#[instrument(skip(state))]
async fn category_summary(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<CategorySummaryEntry>>, ApiError> {
    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::not_found("User does not exist."));
    }

    let rows = Expense::totals_by_category(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(CategorySummaryEntry::from).collect()))
}
