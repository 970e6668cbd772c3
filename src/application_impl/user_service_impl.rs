use crate::application_port::{AuthError, UserService};
use crate::domain_model::{UserId, UserProfile};
use crate::domain_port::UserRepo;
use std::sync::Arc;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
}

impl RealUserService {
    pub fn new(user_repo: Arc<dyn UserRepo>) -> RealUserService {
        RealUserService { user_repo }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .filter(|rec| rec.is_active)
            .map(|rec| rec.profile())
            .ok_or(AuthError::UserNotFound)
    }
}
