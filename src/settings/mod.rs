//! Settings come from a TOML file, then `TOKENGATE__*` environment variables.
//! See `settings/dev.toml` for the full set of keys.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
