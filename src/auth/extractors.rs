use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::{ApiError, AuthError};
use crate::state::AppState;
use crate::users::repo::User;

/// Verified identity attached to the request after the guard passes.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role_name.as_deref(), Some("Super Admin") | Some("Admin"))
    }
}

/// Extracts and validates the bearer token, resolving the subject against
/// the database so revoked users stop authenticating immediately.
pub struct AuthUser(pub CurrentUser);

/// Same as [`AuthUser`] but additionally requires an admin role.
pub struct RequireAdmin(pub CurrentUser);

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(AuthError::InvalidScheme)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            e
        })?;

        let record = User::find_auth_record(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.sub, "token subject no longer exists");
                AuthError::UnknownUser
            })?;

        Ok(AuthUser(CurrentUser {
            id: record.id,
            email: record.email,
            role_id: record.role_id,
            role_name: record.role_name,
        }))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(
                user_id = user.id,
                email = %user.email,
                role_id = ?user.role_id,
                role = ?user.role_name,
                "admin route refused"
            );
            return Err(AuthError::InsufficientRole.into());
        }
        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn missing_header_is_missing_token() {
        assert!(matches!(
            bearer_token(&headers_with(None)),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        assert!(matches!(
            bearer_token(&headers_with(Some("Basic dXNlcjpwdw=="))),
            Err(AuthError::InvalidScheme)
        ));
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            bearer_token(&headers_with(Some("Bearer abc.def.ghi"))).unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token(&headers_with(Some("bearer abc.def.ghi"))).unwrap(),
            "abc.def.ghi"
        );
    }

    fn user_with_role(role_name: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "user@example.com".to_string(),
            role_id: role_name.map(|_| 1),
            role_name: role_name.map(|r| r.to_string()),
        }
    }

    #[test]
    fn admin_check_accepts_both_admin_roles_only() {
        assert!(user_with_role(Some("Super Admin")).is_admin());
        assert!(user_with_role(Some("Admin")).is_admin());
        assert!(!user_with_role(Some("User")).is_admin());
        assert!(!user_with_role(None).is_admin());
    }
}
