use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const STAFF_ROLE: &str = "staff";

/// Token payload issued to kitchen and front-of-house staff.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct StaffUser {
    pub subject: String,
    pub role: String,
}

pub fn ensure_role(user: &StaffUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_staff(user: &StaffUser) -> Result<(), AppError> {
    ensure_role(user, STAFF_ROLE)
}

pub fn decode_staff_token(token: &str, secret: &str) -> Result<StaffUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    Ok(StaffUser {
        subject: decoded.claims.sub,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?;

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        decode_staff_token(token, &secret)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(role: &str, secret: &str) -> String {
        let claims = Claims {
            sub: "kitchen-1".into(),
            role: role.into(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token")
    }

    #[test]
    fn staff_token_is_accepted() {
        let user = decode_staff_token(&token("staff", "s3cret"), "s3cret").expect("staff");
        assert_eq!(user.subject, "kitchen-1");
        assert!(ensure_staff(&user).is_ok());
    }

    #[test]
    fn other_roles_are_forbidden() {
        let user = decode_staff_token(&token("customer", "s3cret"), "s3cret").expect("decoded");
        assert!(matches!(ensure_staff(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let result = decode_staff_token(&token("staff", "s3cret"), "other");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
