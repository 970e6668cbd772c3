use crate::application_port::AuthError;

pub const DEFAULT_MIN_PASSWORD_LEN: usize = 8;

/// Minimum length, at least one letter and at least one digit.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_len: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_len {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {} characters",
                self.min_len
            )));
        }
        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(AuthError::WeakPassword(
                "password must contain a letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword(
                "password must contain a digit".to_string(),
            ));
        }
        Ok(())
    }
}
