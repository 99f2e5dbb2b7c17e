use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::auth::extractors::{AuthUser, RequireAdmin};
use crate::error::ApiError;
use crate::modules::dto::{CreateModuleRequest, ModuleResponse, UpdateModuleRequest};
use crate::modules::repo::Module;
use crate::pagination::{ListParams, Page};
use crate::state::AppState;

const SORT_FIELDS: &[&str] = &["name", "created_at"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/module", post(create_module).get(list_modules))
        .route(
            "/module/:id",
            get(get_module).put(update_module).delete(delete_module),
        )
}

fn validate_label(field: &str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < 1 || len > 20 {
        return Err(ApiError::validation(format!(
            "{} must be between 1 and 20 characters",
            field
        )));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
async fn create_module(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    validate_label("name", &payload.name)?;
    validate_label("link_name", &payload.link_name)?;

    if Module::find_by_name_or_link(&state.db, &payload.name, &payload.link_name)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(
            "A module with this name or link already exists.",
        ));
    }

    let module = Module::create(
        &state.db,
        &payload.name,
        &payload.link_name,
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| {
        ApiError::conflict_on_unique(e, "A module with this name or link already exists.")
    })?;

    info!(module_id = module.id, actor = admin.id, "module created");
    Ok((StatusCode::CREATED, Json(module.into())))
}

#[instrument(skip(state))]
async fn list_modules(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ModuleResponse>>, ApiError> {
    let sort = params.sort_spec(SORT_FIELDS)?;
    let total = Module::count(&state.db).await?;
    let modules = Module::list(&state.db, sort, params.skip, params.limit).await?;
    let items = modules.into_iter().map(ModuleResponse::from).collect();
    Ok(Json(Page::new(total, &params, items)))
}

#[instrument(skip(state))]
async fn get_module(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module = Module::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Module does not exist."))?;
    Ok(Json(module.into()))
}

#[instrument(skip(state, payload))]
async fn update_module(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<Json<ModuleResponse>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        validate_label("name", name)?;
    }
    if let Some(link_name) = payload.link_name.as_deref() {
        validate_label("link_name", link_name)?;
    }

    let module = Module::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.link_name.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| {
        ApiError::conflict_on_unique(e, "A module with this name or link already exists.")
    })?
    .ok_or_else(|| ApiError::not_found("Module does not exist."))?;

    info!(module_id = id, actor = admin.id, "module updated");
    Ok(Json(module.into()))
}

#[instrument(skip(state))]
async fn delete_module(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let deleted = Module::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Module does not exist."));
    }
    info!(module_id = id, actor = admin.id, "module deleted");
    Ok(Json(json!({ "message": "Module has been deleted successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_length_bounds() {
        assert!(validate_label("name", "Dashboard").is_ok());
        assert!(validate_label("name", "").is_err());
        assert!(validate_label("link_name", &"x".repeat(21)).is_err());
    }
}
