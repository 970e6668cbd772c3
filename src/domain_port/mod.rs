// store

mod revocation_registry;

pub use revocation_registry::*;

// repo

mod user_repo;

pub use user_repo::*;
