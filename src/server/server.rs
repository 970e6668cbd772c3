use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Duration;
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub lifecycle: Arc<TokenLifecycle>,
    revocations: Arc<dyn RevocationRegistry>,
}

impl Server {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let revocations = Arc::new(MemoryRevocationRegistry::new());

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(
            JwtConfig {
                issuer: settings.auth.issuer.clone(),
                audience: settings.auth.audience.clone(),
                access_secret: settings.auth.access_secret.clone().into_bytes(),
                refresh_secret: settings.auth.refresh_secret.clone().into_bytes(),
                relax_audience: settings.relax_audience(),
                leeway_secs: settings.auth.leeway_secs,
            },
            revocations.clone(),
        ));
        if settings.relax_audience() {
            warn!("audience and issuer checks are disabled ({:?})", settings.environment);
        }

        let lifecycle = Arc::new(TokenLifecycle::new(
            token_codec,
            revocations.clone(),
            TokenTtl {
                access: Duration::minutes(settings.auth.access_ttl_minutes),
                refresh: Duration::days(settings.auth.refresh_ttl_days),
            },
        ));

        let user_repo: Arc<dyn UserRepo> = Arc::new(MemoryUserRepo::new());
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher,
            lifecycle.clone(),
            PasswordPolicy {
                min_len: settings.user.min_password_len,
            },
        ));
        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(user_repo));

        info!("server started");

        Ok(Self {
            auth_service,
            user_service,
            lifecycle,
            revocations,
        })
    }

    pub fn revoked_count(&self) -> usize {
        self.revocations.len()
    }

    pub fn shutdown(&self) {
        info!(revoked = self.revoked_count(), "server shutting down...");
    }
}
