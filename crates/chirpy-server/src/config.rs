use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me"];

const DEFAULT_BANNED_WORDS: &str = "kerfuffle,sharbert,fornax";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub banned_words: Vec<String>,
    pub fileserver_root: PathBuf,
    pub session_sweep_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("CHIRPY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CHIRPY_JWT_SECRET is unset or still a placeholder");
        }

        let port = get("CHIRPY_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("CHIRPY_PORT must be a port number")?;
        let session_sweep_secs = get("CHIRPY_SESSION_SWEEP_SECS")
            .unwrap_or_else(|| "3600".into())
            .parse()
            .context("CHIRPY_SESSION_SWEEP_SECS must be a number of seconds")?;
        if session_sweep_secs == 0 {
            bail!("CHIRPY_SESSION_SWEEP_SECS must be greater than zero");
        }

        let banned_words = get("CHIRPY_BANNED_WORDS")
            .unwrap_or_else(|| DEFAULT_BANNED_WORDS.into())
            .split(',')
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        Ok(Self {
            jwt_secret,
            db_path: get("CHIRPY_DB_PATH")
                .unwrap_or_else(|| "database.json".into())
                .into(),
            host: get("CHIRPY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            banned_words,
            fileserver_root: get("CHIRPY_FILESERVER_ROOT")
                .unwrap_or_else(|| ".".into())
                .into(),
            session_sweep_secs,
        })
    }
}
