use crate::application_port::AuthError;
use crate::domain_model::{UserId, UserProfile};

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, AuthError>;
}
