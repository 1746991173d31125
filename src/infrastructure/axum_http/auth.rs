use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{config::config_loader, domain::value_objects::iam::UserIdentity};

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub picture_url: Option<String>,
    pub exp: usize,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            format!("Unauthorized: {}", self.0),
        )
            .into_response()
    }
}

pub fn validate_identity_jwt(token: &str, secret: &str) -> Result<IdentityClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<IdentityClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Extractor for the identity-provider bearer token. The `sub` claim is the
/// token identifier accounts are keyed by.
#[derive(Debug, Clone)]
pub struct IdentityUser(pub UserIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for IdentityUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        if !auth_str.starts_with("Bearer ") {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_str[7..];

        let secret = config_loader::get_identity_secret()
            .map_err(|e| (StatusCode::UNAUTHORIZED, format!("Unauthorized: {}", e)))?;

        let claims = validate_identity_jwt(token, &secret.jwt_secret)
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.0.to_string()))?;

        Ok(IdentityUser(UserIdentity {
            token_identifier: claims.sub,
            name: claims.name,
            email: claims.email,
            picture_url: claims.picture_url,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "supersecretjwtsecretforunittesting123";

    fn sample_claims(exp: usize) -> IdentityClaims {
        IdentityClaims {
            sub: "ident|user-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture_url: None,
            exp,
        }
    }

    fn sign(claims: &IdentityClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_identity_jwt_success() {
        let token = sign(&sample_claims(9999999999), SECRET);

        let claims = validate_identity_jwt(&token, SECRET).expect("Valid token should pass");
        assert_eq!(claims.sub, "ident|user-1");
        assert_eq!(claims.email, "ada@example.com");
    }

    #[test]
    fn test_validate_identity_jwt_expired() {
        let token = sign(&sample_claims(1), SECRET);

        let result = validate_identity_jwt(&token, SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_identity_jwt_invalid_signature() {
        let token = sign(&sample_claims(9999999999), "wrongsecret");

        let result = validate_identity_jwt(&token, SECRET);
        assert!(result.is_err());
    }
}
