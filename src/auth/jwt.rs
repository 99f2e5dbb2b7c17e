use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::JwtConfig;
use crate::error::AuthError;
use crate::state::AppState;

/// JWT payload: who the caller is and which role they held at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,                 // user ID
    pub email: String,            // user email at issue time
    pub role_id: Option<i32>,     // assigned role, if any
    pub iat: usize,               // issued at (unix timestamp)
    pub exp: usize,               // expires at (unix timestamp)
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            algorithm,
            expire_minutes,
        } = state.config.jwt.clone();
        Self::new(&secret, algorithm, expire_minutes)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, algorithm: Algorithm, expire_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl: Duration::from_secs(expire_minutes.max(0) as u64 * 60),
        }
    }

    pub fn sign(&self, user_id: i32, email: &str, role_id: Option<i32>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(self.algorithm);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, expire_minutes: i64) -> JwtKeys {
        JwtKeys::new(secret, Algorithm::HS256, expire_minutes)
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", 30);
        let token = keys.sign(42, "user@example.com", Some(3)).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role_id, Some(3));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // Back-date exp past the library's 60s default leeway.
        let issued = OffsetDateTime::now_utc() - TimeDuration::seconds(300);
        let claims = Claims {
            sub: 1,
            email: "old@example.com".to_string(),
            role_id: None,
            iat: issued.unix_timestamp() as usize,
            exp: (issued + TimeDuration::seconds(60)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        let keys = make_keys("dev-secret", 30);
        assert!(matches!(keys.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn wrong_secret_is_an_invalid_signature() {
        let keys = make_keys("dev-secret", 30);
        let token = keys.sign(7, "user@example.com", None).expect("sign");
        let other = make_keys("other-secret", 30);
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys("dev-secret", 30);
        assert!(matches!(keys.verify("not.a.jwt"), Err(AuthError::Malformed)));
        assert!(matches!(keys.verify(""), Err(AuthError::Malformed)));
    }
}
