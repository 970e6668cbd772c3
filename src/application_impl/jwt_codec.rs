use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::RevocationCheck;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    /// Skip audience and issuer checks. Only meant for test environments.
    pub relax_audience: bool,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("relax_audience", &self.relax_audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    jti: String,
    #[serde(rename = "type")]
    token_type: TokenType,
    iat: i64,
    exp: i64,
    iss: String,
    aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_jti: Option<String>,
}

/// Only the `type` claim, read before the signature is checked so that a
/// token of the other type is reported as such.
#[derive(Debug, Deserialize)]
struct TypeClaim {
    #[serde(rename = "type")]
    token_type: TokenType,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        KeyPair {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HS256 codec with one signing key per token type.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
    peek: Validation,
    revocations: Arc<dyn RevocationCheck>,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig, revocations: Arc<dyn RevocationCheck>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = cfg.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        if cfg.relax_audience {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[cfg.audience.as_str()]);
            validation.set_issuer(&[cfg.issuer.as_str()]);
        }

        let mut peek = Validation::new(Algorithm::HS256);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        peek.validate_aud = false;
        peek.required_spec_claims.clear();

        JwtHs256Codec {
            access_keys: KeyPair::from_secret(&cfg.access_secret),
            refresh_keys: KeyPair::from_secret(&cfg.refresh_secret),
            cfg,
            validation,
            peek,
            revocations,
        }
    }

    fn keys(&self, token_type: TokenType) -> &KeyPair {
        match token_type {
            TokenType::Access => &self.access_keys,
            TokenType::Refresh => &self.refresh_keys,
        }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience => AuthError::TokenWrongAudience,
            _ => AuthError::TokenInvalid,
        }
    }

    fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
        DateTime::from_timestamp(secs, 0).ok_or(AuthError::TokenInvalid)
    }

    fn into_claims(claims: JwtClaims) -> Result<TokenClaims, AuthError> {
        let subject = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenInvalid)?;
        Ok(TokenClaims {
            subject,
            jti: claims.jti,
            token_type: claims.token_type,
            issued_at: Self::timestamp(claims.iat)?,
            expires_at: Self::timestamp(claims.exp)?,
            issuer: claims.iss,
            audience: claims.aud,
            linked_jti: claims.linked_jti,
        })
    }
}

impl TokenCodec for JwtHs256Codec {
    fn new_jti(&self) -> String {
        Self::gen_jti()
    }

    fn encode(&self, draft: TokenDraft) -> Result<IssuedToken, AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt.checked_add_signed(draft.ttl).ok_or_else(|| {
            AuthError::InternalError(format!("token ttl out of range: {}", draft.ttl))
        })?;
        let claims = JwtClaims {
            sub: draft.subject.to_string(),
            jti: draft.jti,
            token_type: draft.token_type,
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            linked_jti: draft.linked_jti,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(draft.token_type).encoding,
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        debug!(jti = %claims.jti, token_type = %claims.token_type, sub = %claims.sub, "token issued");
        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at: exp_dt,
        })
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let declared = decode::<TypeClaim>(token, &self.keys(expected).decoding, &self.peek)
            .map_err(|_| AuthError::TokenInvalid)?
            .claims
            .token_type;
        if declared != expected {
            debug!(%expected, %declared, "token type mismatch");
            return Err(AuthError::TokenWrongType);
        }

        let data = decode::<JwtClaims>(token, &self.keys(expected).decoding, &self.validation)
            .map_err(Self::map_decode_error)?;
        if data.claims.token_type != expected {
            return Err(AuthError::TokenWrongType);
        }
        let claims = Self::into_claims(data.claims)?;

        if self.revocations.is_revoked(&claims.jti) {
            debug!(jti = %claims.jti, "token revoked");
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::RevocationRegistry;
    use crate::infra_memory::MemoryRevocationRegistry;
    use chrono::Duration;

    fn config() -> JwtConfig {
        JwtConfig {
            issuer: "tokengate.test".to_string(),
            audience: "tokengate-api".to_string(),
            access_secret: b"access-secret".to_vec(),
            refresh_secret: b"refresh-secret".to_vec(),
            relax_audience: false,
            leeway_secs: 0,
        }
    }

    fn codec_with(cfg: JwtConfig) -> (JwtHs256Codec, Arc<MemoryRevocationRegistry>) {
        let registry = Arc::new(MemoryRevocationRegistry::new());
        (JwtHs256Codec::new(cfg, registry.clone()), registry)
    }

    fn sign_raw(claims: &JwtClaims, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn raw_claims(token_type: TokenType) -> JwtClaims {
        let now = Utc::now().timestamp();
        JwtClaims {
            sub: "42".to_string(),
            jti: "raw-jti".to_string(),
            token_type,
            iat: now,
            exp: now + 600,
            iss: "tokengate.test".to_string(),
            aud: "tokengate-api".to_string(),
            linked_jti: None,
        }
    }

    #[test]
    fn issued_token_validates_with_all_claims() {
        let (codec, _) = codec_with(config());
        let issued = codec
            .issue(
                UserId(42),
                TokenType::Access,
                Duration::minutes(15),
                Some("partner".to_string()),
            )
            .unwrap();

        let claims = codec.validate(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.subject, UserId(42));
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.issuer, "tokengate.test");
        assert_eq!(claims.audience, "tokengate-api");
        assert_eq!(claims.linked_jti.as_deref(), Some("partner"));
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
        assert!(claims.expires_at > claims.issued_at);
    }

    #[test]
    fn out_of_range_ttl_is_an_error() {
        let (codec, _) = codec_with(config());
        let result = codec.issue(
            UserId(1),
            TokenType::Refresh,
            Duration::days(1_000_000_000),
            None,
        );

        assert!(matches!(result, Err(AuthError::InternalError(_))));
    }

    #[test]
    fn every_issue_gets_a_fresh_jti() {
        let (codec, _) = codec_with(config());
        let a = codec
            .issue(UserId(1), TokenType::Access, Duration::minutes(1), None)
            .unwrap();
        let b = codec
            .issue(UserId(1), TokenType::Access, Duration::minutes(1), None)
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn refresh_token_is_wrong_type_for_access() {
        let (codec, _) = codec_with(config());
        let refresh = codec
            .issue(UserId(1), TokenType::Refresh, Duration::days(7), None)
            .unwrap();

        assert_eq!(
            codec.validate(&refresh.token, TokenType::Access),
            Err(AuthError::TokenWrongType)
        );
    }

    #[test]
    fn access_token_is_wrong_type_for_refresh() {
        let (codec, _) = codec_with(config());
        let access = codec
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();

        assert_eq!(
            codec.validate(&access.token, TokenType::Refresh),
            Err(AuthError::TokenWrongType)
        );
    }

    #[test]
    fn wrong_type_is_reported_even_with_a_bad_signature() {
        let (codec, _) = codec_with(config());
        let forged = sign_raw(&raw_claims(TokenType::Refresh), b"attacker-key");

        assert_eq!(
            codec.validate(&forged, TokenType::Access),
            Err(AuthError::TokenWrongType)
        );
    }

    #[test]
    fn type_claim_signed_with_the_other_key_is_invalid() {
        let (codec, _) = codec_with(config());
        // Claims say access, but the signature comes from the refresh key.
        let substituted = sign_raw(&raw_claims(TokenType::Access), b"refresh-secret");

        assert_eq!(
            codec.validate(&substituted, TokenType::Access),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn tampered_token_is_invalid() {
        let (codec, _) = codec_with(config());
        let issued = codec
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();
        let mut tampered = issued.token.clone();
        tampered.push('x');

        assert_eq!(
            codec.validate(&tampered, TokenType::Access),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let (codec, _) = codec_with(config());
        assert_eq!(
            codec.validate("not.a.jwt", TokenType::Access),
            Err(AuthError::TokenInvalid)
        );
        assert_eq!(
            codec.validate("", TokenType::Refresh),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let (codec, _) = codec_with(config());
        let issued = codec
            .issue(UserId(1), TokenType::Access, Duration::seconds(-120), None)
            .unwrap();

        assert_eq!(
            codec.validate(&issued.token, TokenType::Access),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn expired_and_revoked_reports_expired() {
        let (codec, registry) = codec_with(config());
        let issued = codec
            .issue(UserId(1), TokenType::Refresh, Duration::seconds(-120), None)
            .unwrap();
        registry.revoke(&issued.jti);

        assert_eq!(
            codec.validate(&issued.token, TokenType::Refresh),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn foreign_audience_is_rejected() {
        let (issuer, _) = codec_with(JwtConfig {
            audience: "some-other-api".to_string(),
            ..config()
        });
        let (verifier, _) = codec_with(config());
        let issued = issuer
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();

        assert_eq!(
            verifier.validate(&issued.token, TokenType::Access),
            Err(AuthError::TokenWrongAudience)
        );
    }

    #[test]
    fn relaxed_mode_accepts_foreign_audience() {
        let (issuer, _) = codec_with(JwtConfig {
            audience: "some-other-api".to_string(),
            issuer: "someone-else".to_string(),
            ..config()
        });
        let (verifier, _) = codec_with(JwtConfig {
            relax_audience: true,
            ..config()
        });
        let issued = issuer
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();

        let claims = verifier.validate(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.audience, "some-other-api");
    }

    #[test]
    fn foreign_issuer_is_invalid() {
        let (issuer, _) = codec_with(JwtConfig {
            issuer: "someone-else".to_string(),
            ..config()
        });
        let (verifier, _) = codec_with(config());
        let issued = issuer
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();

        assert_eq!(
            verifier.validate(&issued.token, TokenType::Access),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn revoked_token_is_rejected() {
        let (codec, registry) = codec_with(config());
        let issued = codec
            .issue(UserId(1), TokenType::Access, Duration::minutes(5), None)
            .unwrap();
        registry.revoke(&issued.jti);

        assert_eq!(
            codec.validate(&issued.token, TokenType::Access),
            Err(AuthError::TokenRevoked)
        );
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let (codec, _) = codec_with(config());
        let mut claims = raw_claims(TokenType::Access);
        claims.sub = "alice".to_string();
        let token = sign_raw(&claims, b"access-secret");

        assert_eq!(
            codec.validate(&token, TokenType::Access),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("refresh-secret"));
    }
}
