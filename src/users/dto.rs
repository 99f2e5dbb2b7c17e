use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::roles::dto::RoleResponse;
use crate::users::repo::UserWithRole;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Request body for profile updates; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i32>,
}

/// Request body for password changes.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public part of a user returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub role: Option<RoleResponse>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserWithRole> for UserResponse {
    fn from(user: UserWithRole) -> Self {
        let role = match (user.role_id, user.role_name) {
            (Some(id), Some(name)) => Some(RoleResponse {
                id,
                name,
                description: user.role_description,
            }),
            _ => None,
        };
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn response_never_exposes_the_password_hash() {
        let user = UserWithRole {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role_id: Some(3),
            role_name: Some("User".to_string()),
            role_description: Some("User-related modules permission.".to_string()),
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00:00 UTC),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(json.contains("\"name\":\"User\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn missing_role_serializes_as_null() {
        let user = UserWithRole {
            id: 2,
            first_name: "Grace".to_string(),
            last_name: None,
            email: "grace@example.com".to_string(),
            password_hash: "hash".to_string(),
            role_id: None,
            role_name: None,
            role_description: None,
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00:00 UTC),
        };
        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(value["role"].is_null());
    }
}
