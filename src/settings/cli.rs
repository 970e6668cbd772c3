use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "tokengate", about = "Token issuing and revocation service")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,

    /// Overrides `http.address` from the settings file.
    #[arg(long)]
    pub address: Option<String>,
}
