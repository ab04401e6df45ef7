use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::gate::Role;
use crate::config::AuthConfig;
use crate::error::{AuthFailure, ServiceError};
use crate::ids::UserId;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Token handed back to clients after a successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// HS256 signer/verifier built from the immutable auth configuration.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_ttl(&config.secret_key, config.token_ttl())
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(
        &self,
        user_id: &UserId,
        email: &str,
        role: Role,
    ) -> Result<IssuedToken, ServiceError> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(ServiceError::TokenLifetime)?;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(ServiceError::TokenIssue)?;

        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthFailure> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected bearer token");
                AuthFailure::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_round_trip_claims() {
        let issuer = TokenIssuer::with_ttl("secret", Duration::minutes(30));
        let user_id = UserId::from("user-1");
        let token = issuer
            .issue(&user_id, "student@example.com", Role::Student)
            .expect("token issues");
        assert_eq!(token.token_type, "bearer");

        let claims = issuer.verify(&token.access_token).expect("token verifies");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "student@example.com");
        assert_eq!(claims.role, Role::Student);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = TokenIssuer::with_ttl("secret", Duration::minutes(30));
        let other = TokenIssuer::with_ttl("other-secret", Duration::minutes(30));
        let token = other
            .issue(&UserId::from("user-1"), "a@example.com", Role::Admin)
            .expect("token issues");
        assert_eq!(
            issuer.verify(&token.access_token),
            Err(AuthFailure::InvalidToken)
        );
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let issuer = TokenIssuer::with_ttl("secret", Duration::milliseconds(i64::MAX));
        let result = issuer.issue(&UserId::from("user-1"), "a@example.com", Role::Student);
        assert!(matches!(result, Err(ServiceError::TokenLifetime)));
    }

    #[test]
    fn oversized_configured_lifetime_still_issues() {
        let config = AuthConfig {
            secret_key: "secret".to_string(),
            token_ttl_minutes: i64::MAX,
            super_admin_emails: Vec::new(),
        };
        let token = TokenIssuer::new(&config)
            .issue(&UserId::from("user-1"), "a@example.com", Role::Student)
            .expect("token issues");
        assert!(token.expires_at > Utc::now());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::with_ttl("secret", Duration::minutes(-10));
        let token = issuer
            .issue(&UserId::from("user-1"), "a@example.com", Role::Student)
            .expect("token issues");
        assert_eq!(
            issuer.verify(&token.access_token),
            Err(AuthFailure::InvalidToken)
        );
        assert_eq!(issuer.verify("not-a-jwt"), Err(AuthFailure::InvalidToken));
    }
}
