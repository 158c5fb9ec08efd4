//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// Access token lifetime (30 minutes)
pub const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Refresh token lifetime (1 day)
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 1;

/// JWT issuer
pub const JWT_ISSUER: &str = "verigate";

/// JWT audience
pub const JWT_AUDIENCE: &str = "verigate-api";

/// Kind of token a set of claims belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID the token was issued to
    pub user_id: String,

    /// Role computed from group membership at issuance time
    pub role: Role,

    /// Whether this is an access or a refresh token
    pub token_type: TokenKind,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    fn new(user_id: Uuid, role: Role, token_type: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();
        let expiry = now + lifetime;

        Self {
            user_id: user_id.to_string(),
            role,
            token_type,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Creates new claims for an access token
    pub fn new_access_token(user_id: Uuid, role: Role, lifetime_minutes: i64) -> Self {
        Self::new(
            user_id,
            role,
            TokenKind::Access,
            Duration::minutes(lifetime_minutes),
        )
    }

    /// Creates new claims for a refresh token
    pub fn new_refresh_token(user_id: Uuid, role: Role, lifetime_days: i64) -> Self {
        Self::new(
            user_id,
            role,
            TokenKind::Refresh,
            Duration::days(lifetime_days),
        )
    }

    /// Gets the user ID from the claims
    pub fn subject(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.user_id)
    }

    /// Gets the token ID from the claims
    pub fn token_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.jti)
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiration as a timestamp type
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Ledger row for an issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// JWT ID of the refresh token
    pub jti: Uuid,

    /// User the token was issued to
    pub user_id: Uuid,

    /// SHA-256 hash of the serialized token
    pub token_hash: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Creates a new ledger record
    pub fn new(jti: Uuid, user_id: Uuid, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti,
            user_id,
            token_hash,
            issued_at: Utc::now(),
            expires_at,
        }
    }

    /// Checks if the recorded token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Token pair returned to the client on successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Timestamp when the access token expires
    pub access_token_expiry: DateTime<Utc>,

    /// Role embedded in the pair
    pub user_role: Role,

    /// User the pair was issued to
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new_access_token(user_id, Role::Admin, 30);

        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, JWT_ISSUER);
        assert_eq!(claims.aud, JWT_AUDIENCE);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_refresh_token_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new_refresh_token(user_id, Role::Default, 1);

        assert_eq!(claims.token_type, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert!(claims.token_id().is_ok());
    }

    #[test]
    fn test_claims_subject_parsing() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new_access_token(user_id, Role::Default, 30);

        assert_eq!(claims.subject().unwrap(), user_id);
    }

    #[test]
    fn test_claims_expiration() {
        let user_id = Uuid::new_v4();
        let mut claims = Claims::new_access_token(user_id, Role::Default, 30);

        claims.exp = Utc::now().timestamp() - 1;
        assert!(claims.is_expired());
    }

    #[test]
    fn test_refresh_record_expiration() {
        let record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "hash".to_string(),
            Utc::now() - Duration::days(1),
        );

        assert!(record.is_expired());
    }

    #[test]
    fn test_token_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            "\"refresh\""
        );
    }

    #[test]
    fn test_claims_roundtrip() {
        let claims = Claims::new_access_token(Uuid::new_v4(), Role::Superuser, 30);
        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims, deserialized);
    }
}
