//! JWT validation and token extraction helpers

use axum::http::HeaderValue;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Validate a bearer token against the configured secret
pub(crate) fn validate_jwt_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);

    if let Some(aud) = &config.audience {
        validation.set_audience(&[aud]);
    } else {
        validation.validate_aud = false;
    }

    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    if let Some(token) = header_str.strip_prefix("Bearer ") {
        Ok(token.to_string())
    } else {
        Err(AuthError::InvalidAuthorizationFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret".to_string(),
            issuer: None,
            audience: None,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    fn valid_claims() -> Claims {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            username: "maria".to_string(),
            email: Some("maria@example.com".to_string()),
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn test_extract_bearer_token() {
        // Valid bearer token
        let header = HeaderValue::from_static("Bearer abc123");
        let result = extract_bearer_token(&header);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "abc123");

        // Invalid format
        let header = HeaderValue::from_static("abc123");
        assert!(extract_bearer_token(&header).is_err());

        // Basic auth (wrong type)
        let header = HeaderValue::from_static("Basic abc123");
        assert!(extract_bearer_token(&header).is_err());
    }

    #[test]
    fn test_validate_jwt_token_roundtrip() {
        let config = test_config();
        let claims = valid_claims();
        let token = sign(&claims, &config.jwt_secret);

        let decoded = validate_jwt_token(&token, &config).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.username, "maria");
    }

    #[test]
    fn test_validate_jwt_token_wrong_secret() {
        let config = test_config();
        let token = sign(&valid_claims(), "other_secret");
        assert!(matches!(
            validate_jwt_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_jwt_token_expired() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            exp: now - 3600,
            iat: now - 7200,
            ..valid_claims()
        };
        let token = sign(&claims, &config.jwt_secret);
        assert!(matches!(
            validate_jwt_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }
}
