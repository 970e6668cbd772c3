use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

/// User store kept in process memory. Ids are assigned sequentially from 1.
#[derive(Debug)]
pub struct MemoryUserRepo {
    by_email: DashMap<String, UserRecord>,
    email_by_id: DashMap<UserId, String>,
    next_id: AtomicI64,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self {
            by_email: DashMap::new(),
            email_by_id: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email);
        match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                let user_id = UserId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let record = UserRecord {
                    user_id,
                    email: email.clone(),
                    password_hash: password_hash.to_string(),
                    is_active: true,
                    created_at: Utc::now(),
                };
                self.email_by_id.insert(user_id, email);
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let email = normalize_email(email);
        Ok(self.by_email.get(&email).map(|rec| rec.value().clone()))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let Some(email) = self.email_by_id.get(&user_id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_email.get(&email).map(|rec| rec.value().clone()))
    }
}
