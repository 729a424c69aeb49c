use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::UserId;

use crate::Role;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the catalog expects once a token has
/// been decoded/verified by whatever transport/security layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the authenticated user, owner of catalog records.
    pub sub: UserId,

    /// Username the token was issued for.
    pub username: String,

    /// Role granted to the user.
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is intentionally outside this crate.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_for_window(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            username: "alice".to_string(),
            role: Role::new("user"),
            issued_at,
            expires_at,
        }
    }

    #[test]
    fn claims_within_window_validate() {
        let now = Utc::now();
        let claims = claims_for_window(now - Duration::minutes(1), now + Duration::minutes(10));
        assert!(validate_claims(&claims, now).is_ok());
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let claims = claims_for_window(now - Duration::minutes(20), now - Duration::minutes(10));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let now = Utc::now();
        let claims = claims_for_window(now + Duration::minutes(5), now + Duration::minutes(15));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let claims = claims_for_window(now + Duration::minutes(10), now - Duration::minutes(10));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn expiry_instant_is_already_expired() {
        let now = Utc::now();
        let claims = claims_for_window(now - Duration::minutes(10), now);
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::Expired));
    }
}
