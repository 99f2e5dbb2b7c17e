use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::auth::extractors::{AuthUser, RequireAdmin};
use crate::error::ApiError;
use crate::pagination::{ListParams, Page};
use crate::roles::dto::{CreateRoleRequest, RoleResponse, UpdateRoleRequest};
use crate::roles::repo::Role;
use crate::state::AppState;

const SORT_FIELDS: &[&str] = &["name", "created_at"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/role", post(create_role).get(list_roles))
        .route(
            "/role/:id",
            get(get_role).put(update_role).delete(delete_role),
        )
}

#[instrument(skip(state, payload))]
async fn create_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() || name.chars().count() > 20 {
        return Err(ApiError::validation(
            "Role name must be between 1 and 20 characters",
        ));
    }

    if Role::find_by_name(&state.db, name).await?.is_some() {
        warn!(role = name, "role name already taken");
        return Err(ApiError::conflict("A role with this name already exists."));
    }

    let role = Role::create(&state.db, name, payload.description.as_deref())
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "A role with this name already exists."))?;

    info!(role_id = role.id, actor = admin.id, "role created");
    Ok((StatusCode::CREATED, Json(role.into())))
}

#[instrument(skip(state))]
async fn list_roles(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<RoleResponse>>, ApiError> {
    let sort = params.sort_spec(SORT_FIELDS)?;
    let total = Role::count(&state.db).await?;
    let roles = Role::list(&state.db, sort, params.skip, params.limit).await?;
    let items = roles.into_iter().map(RoleResponse::from).collect();
    Ok(Json(Page::new(total, &params, items)))
}

#[instrument(skip(state))]
async fn get_role(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = Role::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role does not exist."))?;
    Ok(Json(role.into()))
}

#[instrument(skip(state, payload))]
async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        match Role::find_by_name(&state.db, name).await? {
            Some(existing) if existing.id != id => {
                return Err(ApiError::conflict("A role with this name already exists."));
            }
            _ => {}
        }
    }

    let role = Role::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "A role with this name already exists."))?
    .ok_or_else(|| ApiError::not_found("Role does not exist."))?;

    info!(role_id = id, actor = admin.id, "role updated");
    Ok(Json(role.into()))
}

#[instrument(skip(state))]
async fn delete_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    if Role::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::not_found("Role does not exist."));
    }

    // Restrict, don't cascade: a role that users still hold stays.
    let referencing = Role::referencing_users(&state.db, id).await?;
    if referencing > 0 {
        warn!(role_id = id, referencing, "role delete refused");
        return Err(ApiError::conflict(
            "This role is still assigned to users and cannot be deleted.",
        ));
    }

    Role::delete(&state.db, id).await?;
    info!(role_id = id, actor = admin.id, "role deleted");
    Ok(Json(json!({ "message": "Role has been deleted successfully." })))
}
