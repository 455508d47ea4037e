//! Bearer token verification.

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use staffdesk_core::AppError;
use tracing::debug;

/// Claims carried by an access token.
///
/// `sub` holds the login of the calling user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies HS256 access tokens against a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<String>) -> Result<Self, AppError> {
        if secret.trim().is_empty() {
            return Err(AppError::Validation(
                "JWT secret must not be empty".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| {
                debug!(%error, "access token rejected");
                AppError::Unauthorized("invalid or expired access token".to_owned())
            })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_owned()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_owned()))?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use staffdesk_core::AppError;

    use super::{AccessTokenClaims, JwtVerifier, bearer_token};

    const SECRET: &str = "test-secret-with-at-least-32-characters";

    fn token(secret: &str, subject: &str, lifetime: Duration, issuer: Option<&str>) -> String {
        let claims = AccessTokenClaims {
            sub: subject.to_owned(),
            exp: u64::try_from((Utc::now() + lifetime).timestamp()).unwrap_or_default(),
            iss: issuer.map(str::to_owned),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap_or_else(|error| panic!("failed to encode test token: {error}"))
    }

    fn verifier(issuer: Option<&str>) -> JwtVerifier {
        JwtVerifier::new(SECRET, issuer.map(str::to_owned))
            .unwrap_or_else(|error| panic!("failed to build verifier: {error}"))
    }

    #[test]
    fn valid_token_yields_subject() {
        let claims = verifier(None).verify(&token(SECRET, "alice", Duration::hours(1), None));
        assert_eq!(claims.ok().map(|claims| claims.sub), Some("alice".to_owned()));
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthorized() {
        let forged = token(
            "another-secret-with-at-least-32-chars",
            "alice",
            Duration::hours(1),
            None,
        );
        assert!(matches!(
            verifier(None).verify(&forged),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let expired = token(SECRET, "alice", Duration::hours(-2), None);
        assert!(matches!(
            verifier(None).verify(&expired),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let verifier = verifier(Some("staffdesk"));
        let trusted = token(SECRET, "alice", Duration::hours(1), Some("staffdesk"));
        let foreign = token(SECRET, "alice", Duration::hours(1), Some("elsewhere"));

        assert!(verifier.verify(&trusted).is_ok());
        assert!(verifier.verify(&foreign).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            JwtVerifier::new("  ", None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).ok(), Some("abc.def"));
    }
}
