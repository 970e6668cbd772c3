mod revocation_registry_memory;
mod user_repo_memory;

pub use revocation_registry_memory::*;
pub use user_repo_memory::*;
