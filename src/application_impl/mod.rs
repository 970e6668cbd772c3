mod argon2_hasher;
mod auth_service_impl;
mod jwt_codec;
mod password_policy;
mod token_lifecycle;
mod user_service_impl;

pub use argon2_hasher::*;
pub use auth_service_impl::*;
pub use jwt_codec::*;
pub use password_policy::*;
pub use token_lifecycle::*;
pub use user_service_impl::*;
