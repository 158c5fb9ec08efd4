//! Main token service implementation

use std::collections::HashSet;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::role::Role;
use crate::domain::entities::token::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::RefreshTokenLedger;

use super::config::TokenServiceConfig;
use super::key_manager::Rs256KeyManager;

/// Service minting JWT access/refresh pairs and managing rotation
///
/// Every issued refresh token is recorded in the outstanding ledger;
/// rotation blacklists the presented token before its successor is
/// issued, so a token is redeemable at most once. Access tokens are
/// never blacklisted, they simply expire.
pub struct TokenService<L: RefreshTokenLedger> {
    pub(crate) ledger: L,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<L: RefreshTokenLedger> TokenService<L> {
    /// Creates a new token service with an RS256 keypair
    pub fn new(ledger: L, config: TokenServiceConfig, key_manager: Rs256KeyManager) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            ledger,
            config,
            encoding_key: key_manager.encoding_key().clone(),
            decoding_key: key_manager.decoding_key().clone(),
            validation,
        }
    }

    /// Mints a token pair for a user
    ///
    /// The embedded role is computed from the given group membership at
    /// issuance time; the refresh token is recorded in the ledger.
    pub async fn issue_pair(
        &self,
        user: &User,
        group_names: &HashSet<String>,
    ) -> DomainResult<TokenPair> {
        let role = Role::from_groups(group_names);

        let access_claims = Claims::new_access_token(
            user.id,
            role,
            self.config.access_token_lifetime_minutes,
        );
        let refresh_claims =
            Claims::new_refresh_token(user.id, role, self.config.refresh_token_lifetime_days);

        let access_token = self.encode_jwt(&access_claims)?;
        let refresh_token = self.encode_jwt(&refresh_claims)?;

        let jti = refresh_claims
            .token_id()
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;
        let record = RefreshTokenRecord::new(
            jti,
            user.id,
            Self::hash_token(&refresh_token),
            refresh_claims.expires_at(),
        );
        self.ledger
            .record_issued(record)
            .await
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        tracing::info!(
            user_id = %user.id,
            role = %role,
            event = "token_pair_issued",
            "Issued access/refresh token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expiry: access_claims.expires_at(),
            user_role: role,
            user_id: user.id,
        })
    }

    /// Rotates a refresh token: blacklist the presented token, then
    /// issue a fresh pair with the role recomputed from current groups
    ///
    /// The blacklist insert is first-wins; of two concurrent rotations
    /// of the same token exactly one succeeds, the other observes the
    /// entry and fails with `TokenBlacklisted`.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        user: &User,
        group_names: &HashSet<String>,
    ) -> DomainResult<TokenPair> {
        let claims = self.decode_refresh_token(refresh_token)?;
        let jti = claims
            .token_id()
            .map_err(|_| DomainError::Token(TokenError::TokenInvalid))?;

        if self
            .ledger
            .is_blacklisted(jti)
            .await
            .map_err(internal_ledger_error)?
        {
            tracing::warn!(
                user_id = %claims.user_id,
                event = "token_reuse_detected",
                "Rotation attempted with a blacklisted refresh token"
            );
            return Err(DomainError::Token(TokenError::TokenBlacklisted));
        }

        // Consume before issuing the successor so a replay fails closed
        let newly_blacklisted = self
            .ledger
            .blacklist(jti, claims.expires_at())
            .await
            .map_err(internal_ledger_error)?;
        if !newly_blacklisted {
            return Err(DomainError::Token(TokenError::TokenBlacklisted));
        }

        tracing::info!(
            user_id = %user.id,
            event = "token_rotated",
            "Refresh token rotated"
        );

        self.issue_pair(user, group_names).await
    }

    /// Revokes a refresh token on logout
    ///
    /// Fails with `MissingToken` for absent input and `TokenInvalid`
    /// for undecodable tokens; revoking an already-revoked token is a
    /// no-op. The paired access token is left to expire on its own.
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<()> {
        if refresh_token.trim().is_empty() {
            return Err(DomainError::Token(TokenError::MissingToken));
        }

        let claims = self.decode_refresh_token(refresh_token)?;
        let jti = claims
            .token_id()
            .map_err(|_| DomainError::Token(TokenError::TokenInvalid))?;

        self.ledger
            .blacklist(jti, claims.expires_at())
            .await
            .map_err(internal_ledger_error)?;

        tracing::info!(
            user_id = %claims.user_id,
            event = "token_revoked",
            "Refresh token blacklisted on logout"
        );
        Ok(())
    }

    /// Verifies an access token and returns its claims
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.decode_jwt(token)?;
        if claims.token_type != TokenKind::Access {
            return Err(DomainError::Token(TokenError::TokenInvalid));
        }
        Ok(claims)
    }

    /// Decodes a refresh token, checking signature, lifetime, and kind
    pub fn decode_refresh_token(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.decode_jwt(token)?;
        if claims.token_type != TokenKind::Refresh {
            return Err(DomainError::Token(TokenError::TokenInvalid));
        }
        Ok(claims)
    }

    /// Checks whether a refresh token id is blacklisted
    pub async fn is_blacklisted(&self, jti: Uuid) -> DomainResult<bool> {
        self.ledger
            .is_blacklisted(jti)
            .await
            .map_err(internal_ledger_error)
    }

    /// Removes expired ledger and blacklist entries
    pub async fn purge_expired(&self) -> DomainResult<usize> {
        self.ledger
            .purge_expired()
            .await
            .map_err(internal_ledger_error)
    }

    pub(crate) fn encode_jwt(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(Algorithm::RS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    fn decode_jwt(&self, token: &str) -> DomainResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
                    DomainError::Token(TokenError::TokenExpired)
                } else {
                    DomainError::Token(TokenError::TokenInvalid)
                }
            })
    }

    /// Hashes a token for ledger storage
    pub(crate) fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn internal_ledger_error(error: DomainError) -> DomainError {
    match error {
        already @ DomainError::Internal { .. } => already,
        other => DomainError::Internal {
            message: format!("Refresh token ledger failure: {}", other),
        },
    }
}
