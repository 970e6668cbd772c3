use crate::application_impl::{PasswordPolicy, TokenLifecycle};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    lifecycle: Arc<TokenLifecycle>,
    password_policy: PasswordPolicy,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        lifecycle: Arc<TokenLifecycle>,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            lifecycle,
            password_policy,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<UserProfile, AuthError> {
        let SignupInput { email, password } = request;

        self.password_policy.check(&password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let record = self.user_repo.create(&email, &password_hash).await?;

        info!(user_id = %record.user_id, "user registered");
        Ok(record.profile())
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;

        // Unknown email and wrong password look the same to the caller.
        let Some(rec) = self.user_repo.find_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(AuthError::IncorrectCredentials);
        };
        if !rec.is_active {
            return Err(AuthError::IncorrectCredentials);
        }

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            warn!(user_id = %rec.user_id, "login with wrong password");
            return Err(AuthError::IncorrectCredentials);
        }

        let tokens = self.lifecycle.issue_pair(rec.user_id)?;
        info!(user_id = %rec.user_id, "user logged in");

        Ok(LoginResult {
            user_id: rec.user_id,
            tokens,
        })
    }

    async fn authorize(&self, access_token: &str) -> Result<UserId, AuthError> {
        self.lifecycle
            .authorize(&AccessToken(access_token.to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        self.lifecycle
            .refresh(&RefreshToken(refresh_token.to_string()))
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        self.lifecycle
            .logout(&AccessToken(access_token.to_string()))
    }
}
