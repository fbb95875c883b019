//! Environment-backed configuration

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Where the dark-mode preference is persisted.
    pub prefs_path: PathBuf,
    /// Stand-in for the client OS color-scheme preference, used when no
    /// preferences file exists yet.
    pub default_dark_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8083);
        let prefs_path = env::var("PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("h8_prefs.json"));
        let default_dark_mode = env::var("DEFAULT_DARK_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self { port, prefs_path, default_dark_mode }
    }
}
