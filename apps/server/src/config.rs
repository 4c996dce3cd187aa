use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "fortacrypt.json";
const DEFAULT_STATE_FILE: &str = "recovery_state.json";
const DEFAULT_DB_PATH: &str = "fortacrypt.db";

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Recovery configuration document (`FORTACRYPT_CONFIG`)
    pub config_path: PathBuf,
    /// JSON document holding every market's recovery state (`FORTACRYPT_STATE_FILE`)
    pub state_file: PathBuf,
    /// SQLite database for frames and staged trades (`FORTACRYPT_DB_PATH`)
    pub db_path: String,
    /// Optional comma separated subset of markets to run (`FORTACRYPT_MARKETS`)
    pub markets: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let markets = non_empty("FORTACRYPT_MARKETS")
            .map(|raw| {
                raw.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|ids| !ids.is_empty());

        Self {
            config_path: non_empty("FORTACRYPT_CONFIG")
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
                .into(),
            state_file: non_empty("FORTACRYPT_STATE_FILE")
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string())
                .into(),
            db_path: non_empty("FORTACRYPT_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            markets,
        }
    }
}
