use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::RevocationRegistry;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// Issues, rotates and revokes access/refresh pairs.
///
/// This is the only writer of the revocation registry. The codec it is built
/// with must read from the same registry, otherwise revocations go unseen.
pub struct TokenLifecycle {
    codec: Arc<dyn TokenCodec>,
    revocations: Arc<dyn RevocationRegistry>,
    ttl: TokenTtl,
}

impl TokenLifecycle {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        revocations: Arc<dyn RevocationRegistry>,
        ttl: TokenTtl,
    ) -> Self {
        Self {
            codec,
            revocations,
            ttl,
        }
    }

    /// Both identifiers are generated before either token is encoded, so each
    /// side carries the other's `jti` from the start.
    pub fn issue_pair(&self, subject: UserId) -> Result<AuthTokens, AuthError> {
        let access_jti = self.codec.new_jti();
        let refresh_jti = self.codec.new_jti();

        let access = self.codec.encode(TokenDraft {
            jti: access_jti.clone(),
            subject,
            token_type: TokenType::Access,
            ttl: self.ttl.access,
            linked_jti: Some(refresh_jti.clone()),
        })?;
        let refresh = self.codec.encode(TokenDraft {
            jti: refresh_jti,
            subject,
            token_type: TokenType::Refresh,
            ttl: self.ttl.refresh,
            linked_jti: Some(access_jti),
        })?;

        debug!(%subject, access_jti = %access.jti, refresh_jti = %refresh.jti, "token pair issued");
        Ok(AuthTokens {
            access_token: AccessToken(access.token),
            refresh_token: RefreshToken(refresh.token),
            access_token_expires_at: access.expires_at,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    /// Rotates a pair. The replacement is encoded before anything is revoked,
    /// so a failure leaves the old pair untouched. Revoking the presented
    /// `jti` is the commit point: of two concurrent calls with the same
    /// refresh token only one gets past it.
    pub fn refresh(&self, refresh_token: &RefreshToken) -> Result<AuthTokens, AuthError> {
        let claims = self
            .codec
            .validate(refresh_token.as_str(), TokenType::Refresh)?;

        let tokens = self.issue_pair(claims.subject)?;

        if !self.revocations.revoke(&claims.jti) {
            debug!(jti = %claims.jti, "refresh token already consumed");
            return Err(AuthError::TokenRevoked);
        }
        if let Some(linked) = &claims.linked_jti {
            self.revocations.revoke(linked);
        }

        info!(subject = %claims.subject, old_jti = %claims.jti, "token pair rotated");
        Ok(tokens)
    }

    /// Revokes the access token only. The refresh token it was paired with
    /// stays usable; see [`TokenLifecycle::revoke_session`].
    pub fn logout(&self, access_token: &AccessToken) -> Result<(), AuthError> {
        let claims = self
            .codec
            .validate(access_token.as_str(), TokenType::Access)?;
        self.revocations.revoke(&claims.jti);
        info!(subject = %claims.subject, jti = %claims.jti, "access token revoked");
        Ok(())
    }

    /// Like `logout`, but also revokes the paired refresh token.
    pub fn revoke_session(&self, access_token: &AccessToken) -> Result<(), AuthError> {
        let claims = self
            .codec
            .validate(access_token.as_str(), TokenType::Access)?;
        self.revocations.revoke(&claims.jti);
        if let Some(linked) = &claims.linked_jti {
            self.revocations.revoke(linked);
        }
        info!(subject = %claims.subject, jti = %claims.jti, "session revoked");
        Ok(())
    }

    pub fn authorize(&self, access_token: &AccessToken) -> Result<UserId, AuthError> {
        self.codec
            .validate(access_token.as_str(), TokenType::Access)
            .map(|claims| claims.subject)
    }

    /// Full claims of a valid token, for callers that need more than the subject.
    pub fn inspect(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        self.codec.validate(token, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};
    use crate::infra_memory::MemoryRevocationRegistry;
    use std::thread;

    fn lifecycle() -> (TokenLifecycle, Arc<MemoryRevocationRegistry>) {
        let registry = Arc::new(MemoryRevocationRegistry::new());
        let codec = Arc::new(JwtHs256Codec::new(
            JwtConfig {
                issuer: "tokengate.test".to_string(),
                audience: "tokengate-api".to_string(),
                access_secret: b"access-secret".to_vec(),
                refresh_secret: b"refresh-secret".to_vec(),
                relax_audience: false,
                leeway_secs: 0,
            },
            registry.clone(),
        ));
        (
            TokenLifecycle::new(codec, registry.clone(), TokenTtl::default()),
            registry,
        )
    }

    #[test]
    fn pair_is_cross_linked() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(42)).unwrap();

        let access = lc
            .inspect(tokens.access_token.as_str(), TokenType::Access)
            .unwrap();
        let refresh = lc
            .inspect(tokens.refresh_token.as_str(), TokenType::Refresh)
            .unwrap();

        assert_eq!(access.linked_jti.as_deref(), Some(refresh.jti.as_str()));
        assert_eq!(refresh.linked_jti.as_deref(), Some(access.jti.as_str()));
        assert_ne!(access.jti, refresh.jti);
        assert!(tokens.refresh_token_expires_at > tokens.access_token_expires_at);
    }

    #[test]
    fn authorize_then_logout() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(42)).unwrap();

        assert_eq!(lc.authorize(&tokens.access_token), Ok(UserId(42)));
        lc.logout(&tokens.access_token).unwrap();
        assert_eq!(
            lc.authorize(&tokens.access_token),
            Err(AuthError::TokenRevoked)
        );
    }

    #[test]
    fn logout_twice_reports_revoked() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(1)).unwrap();

        lc.logout(&tokens.access_token).unwrap();
        assert_eq!(
            lc.logout(&tokens.access_token),
            Err(AuthError::TokenRevoked)
        );
    }

    #[test]
    fn logout_leaves_refresh_token_usable() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(1)).unwrap();

        lc.logout(&tokens.access_token).unwrap();
        assert!(lc.refresh(&tokens.refresh_token).is_ok());
    }

    #[test]
    fn refresh_rotates_and_revokes_old_pair() {
        let (lc, registry) = lifecycle();
        let old = lc.issue_pair(UserId(7)).unwrap();

        let new = lc.refresh(&old.refresh_token).unwrap();

        assert_eq!(lc.authorize(&new.access_token), Ok(UserId(7)));
        assert_eq!(
            lc.authorize(&old.access_token),
            Err(AuthError::TokenRevoked)
        );
        assert_eq!(
            lc.refresh(&old.refresh_token).unwrap_err(),
            AuthError::TokenRevoked
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn new_pair_keeps_rotating() {
        let (lc, _) = lifecycle();
        let first = lc.issue_pair(UserId(3)).unwrap();
        let second = lc.refresh(&first.refresh_token).unwrap();
        let third = lc.refresh(&second.refresh_token).unwrap();

        assert_eq!(lc.authorize(&third.access_token), Ok(UserId(3)));
        assert_eq!(
            lc.authorize(&second.access_token),
            Err(AuthError::TokenRevoked)
        );
    }

    #[test]
    fn access_token_cannot_refresh() {
        let (lc, registry) = lifecycle();
        let tokens = lc.issue_pair(UserId(1)).unwrap();

        let as_refresh = RefreshToken(tokens.access_token.0.clone());
        assert_eq!(
            lc.refresh(&as_refresh).unwrap_err(),
            AuthError::TokenWrongType
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn refresh_token_cannot_authorize() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(1)).unwrap();

        let as_access = AccessToken(tokens.refresh_token.0.clone());
        assert_eq!(lc.authorize(&as_access), Err(AuthError::TokenWrongType));
    }

    #[test]
    fn failed_refresh_revokes_nothing() {
        let (lc, registry) = lifecycle();
        let tokens = lc.issue_pair(UserId(1)).unwrap();
        let mut broken = tokens.refresh_token.0.clone();
        broken.truncate(broken.len() - 4);

        assert_eq!(
            lc.refresh(&RefreshToken(broken)).unwrap_err(),
            AuthError::TokenInvalid
        );
        assert!(registry.is_empty());
        assert_eq!(lc.authorize(&tokens.access_token), Ok(UserId(1)));
    }

    #[test]
    fn revoke_session_kills_both_halves() {
        let (lc, _) = lifecycle();
        let tokens = lc.issue_pair(UserId(5)).unwrap();

        lc.revoke_session(&tokens.access_token).unwrap();

        assert_eq!(
            lc.authorize(&tokens.access_token),
            Err(AuthError::TokenRevoked)
        );
        assert_eq!(
            lc.refresh(&tokens.refresh_token).unwrap_err(),
            AuthError::TokenRevoked
        );
    }

    #[test]
    fn concurrent_refresh_with_one_token_succeeds_once() {
        let (lc, _) = lifecycle();
        let lc = Arc::new(lc);
        let tokens = lc.issue_pair(UserId(9)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lc = lc.clone();
                let refresh = tokens.refresh_token.clone();
                thread::spawn(move || lc.refresh(&refresh))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == AuthError::TokenRevoked)
        );
    }
}
