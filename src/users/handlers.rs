use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::auth::extractors::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::pagination::{ListParams, Page};
use crate::roles::repo::Role;
use crate::state::AppState;
use crate::users::dto::{
    CreateUserRequest, UpdatePasswordRequest, UpdateUserRequest, UserResponse,
};
use crate::users::repo::User;
use crate::validation::{is_valid_email, validate_name, validate_password_strength};

const SORT_FIELDS: &[&str] = &["email", "first_name", "last_name", "created_at"];

/// Role assigned to self-registered accounts, seeded at startup.
const DEFAULT_ROLE: &str = "User";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/", post(create_user))
        .route("/user/get_all_users/", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/password_update/:id", put(update_password))
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    validate_name("first_name", &payload.first_name)?;
    if let Some(last) = payload.last_name.as_deref() {
        validate_name("last_name", last)?;
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email address."));
    }
    validate_password_strength(&payload.password)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("This email address is already registered."));
    }

    // Seeded at startup; absence is a deployment fault, not a client error.
    let role = Role::find_by_name(&state.db, DEFAULT_ROLE)
        .await?
        .ok_or_else(|| anyhow::anyhow!("default role {:?} is not seeded", DEFAULT_ROLE))?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.first_name,
        payload.last_name.as_deref(),
        &payload.email,
        &hash,
        role.id,
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "This email address is already registered."))?;

    info!(user_id = user.id, email = %user.email, "user created");
    let user = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("freshly created user vanished"))?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let sort = params.sort_spec(SORT_FIELDS)?;
    let total = User::count(&state.db).await?;
    let users = User::list(&state.db, sort, params.skip, params.limit).await?;
    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(total, &params, items)))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist."))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(first) = payload.first_name.as_deref() {
        validate_name("first_name", first)?;
    }
    if let Some(last) = payload.last_name.as_deref() {
        validate_name("last_name", last)?;
    }
    if let Some(role_id) = payload.role_id {
        if Role::find_by_id(&state.db, role_id).await?.is_none() {
            return Err(ApiError::validation("The provided role ID is not valid."));
        }
    }

    let updated = User::update_profile(
        &state.db,
        id,
        payload.first_name.as_deref(),
        payload.last_name.as_deref(),
        payload.role_id,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User does not exist."))?;

    info!(user_id = updated.id, actor = actor.id, "user updated");
    let user = User::find_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist."))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn update_password(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_password_strength(&payload.new_password)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist."))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = id, actor = actor.id, "password change with wrong current password");
        return Err(ApiError::validation("The provided password is incorrect."));
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, id, &hash).await?;

    info!(user_id = id, actor = actor.id, "password updated");
    Ok(Json(json!({ "message": "Password has been updated successfully." })))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let deleted = User::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("User does not exist."));
    }
    info!(user_id = id, actor = actor.id, "user deleted");
    Ok(Json(json!({ "message": "User has been deleted successfully." })))
}
