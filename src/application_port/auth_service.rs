use crate::domain_model::*;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token has the wrong type")]
    TokenWrongType,
    #[error("token issued for another audience")]
    TokenWrongAudience,
    #[error("token revoked")]
    TokenRevoked,
    #[error("weak password: {0}")]
    WeakPassword(String),
    #[error("user not found")]
    UserNotFound,
    #[error("incorrect credentials")]
    IncorrectCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// True for the failures a token can produce on validation.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::TokenInvalid
                | AuthError::TokenWrongType
                | AuthError::TokenWrongAudience
                | AuthError::TokenRevoked
        )
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub tokens: AuthTokens,
}

/// Everything needed to encode one token. The `jti` is chosen by the caller so
/// that a pair can reference each other before either is encoded.
#[derive(Debug, Clone)]
pub struct TokenDraft {
    pub jti: String,
    pub subject: UserId,
    pub token_type: TokenType,
    pub ttl: Duration,
    pub linked_jti: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and checks tokens. Implementations may read the revocation registry
/// but never write to it.
pub trait TokenCodec: Send + Sync {
    /// A fresh identifier, unique for the lifetime of the process.
    fn new_jti(&self) -> String;

    fn encode(&self, draft: TokenDraft) -> Result<IssuedToken, AuthError>;

    /// Signature, expiry, audience and type checks, then revocation. The first
    /// failure wins.
    fn validate(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError>;

    fn issue(
        &self,
        subject: UserId,
        token_type: TokenType,
        ttl: Duration,
        linked_jti: Option<String>,
    ) -> Result<IssuedToken, AuthError> {
        self.encode(TokenDraft {
            jti: self.new_jti(),
            subject,
            token_type,
            ttl,
            linked_jti,
        })
    }
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<UserProfile, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn authorize(&self, access_token: &str) -> Result<UserId, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;
}
