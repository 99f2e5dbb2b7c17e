use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::auth::extractors::AuthUser;
use crate::categories::dto::{
    CategoryListParams, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::categories::repo::Category;
use crate::error::ApiError;
use crate::pagination::Page;
use crate::state::AppState;

const SORT_FIELDS: &[&str] = &["name", "created_at"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/category", post(create_category).get(list_categories))
        .route(
            "/category/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state, payload))]
async fn create_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() || name.chars().count() > 20 {
        return Err(ApiError::validation(
            "Category name must be between 1 and 20 characters",
        ));
    }

    if Category::find_by_name(&state.db, name).await?.is_some() {
        return Err(ApiError::conflict(
            "A category with this name already exists.",
        ));
    }

    let category = Category::create(&state.db, name, payload.description.as_deref())
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, "A category with this name already exists.")
        })?;

    info!(category_id = category.id, actor = actor.id, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[instrument(skip(state))]
async fn list_categories(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<CategoryListParams>,
) -> Result<Json<Page<CategoryResponse>>, ApiError> {
    let page_params = params.page_params();
    let sort = page_params.sort_spec(SORT_FIELDS)?;
    let search = params.search.as_deref();
    let total = Category::count(&state.db, search).await?;
    let categories =
        Category::list(&state.db, search, sort, page_params.skip, page_params.limit).await?;
    let items = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(Json(Page::new(total, &page_params, items)))
}

#[instrument(skip(state))]
async fn get_category(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category does not exist."))?;
    Ok(Json(category.into()))
}

#[instrument(skip(state, payload))]
async fn update_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        match Category::find_by_name(&state.db, name).await? {
            Some(existing) if existing.id != id => {
                return Err(ApiError::conflict(
                    "A category with this name already exists.",
                ));
            }
            _ => {}
        }
    }

    let category = Category::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "A category with this name already exists."))?
    .ok_or_else(|| ApiError::not_found("Category does not exist."))?;

    info!(category_id = id, actor = actor.id, "category updated");
    Ok(Json(category.into()))
}

#[instrument(skip(state))]
async fn delete_category(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    if Category::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::not_found("Category does not exist."));
    }

    let referencing = Category::referencing_expenses(&state.db, id).await?;
    if referencing > 0 {
        warn!(category_id = id, referencing, "category delete refused");
        return Err(ApiError::conflict(
            "This category still has expenses and cannot be deleted.",
        ));
    }

    Category::delete(&state.db, id).await?;
    info!(category_id = id, actor = actor.id, "category deleted");
    Ok(Json(json!({ "message": "Category has been deleted successfully." })))
}
