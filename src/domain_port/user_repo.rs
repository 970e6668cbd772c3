use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user. Fails with `UserExists` if the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserRecord, AuthError>;

    /// Fetch by email (for login).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;
}
