use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

/// Validates an HS256 bearer token and returns the authenticated user.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => "Token expired".to_string(),
        ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
        _ => {
            debug!("Token validation failed: {}", e);
            "Invalid token".to_string()
        }
    })?;

    let claims = data.claims;

    let created_at = claims
        .iat
        .and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single());

    Ok(User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        created_at,
    })
}
