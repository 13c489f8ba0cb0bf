use crate::db::Backend;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub backend: Backend,
    pub responses_path: PathBuf,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub users_path: PathBuf,
    pub survey_config_path: PathBuf,
    pub questions_path: PathBuf,
    pub static_dir: PathBuf,
    pub login_rate_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });

        let backend_raw = var_or("STORAGE_BACKEND", "json");
        let backend = Backend::try_from(backend_raw.as_str()).map_err(|e| anyhow!(e))?;
        let database_url = env::var("DATABASE_URL").ok();
        if backend == Backend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL missing for the postgres storage backend");
        }

        Ok(Self {
            bind_addr,
            backend,
            responses_path: var_or("RESPONSES_PATH", "data/responses.json").into(),
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            users_path: var_or("USERS_PATH", "data/users.json").into(),
            survey_config_path: var_or("SURVEY_CONFIG_PATH", "data/config.json").into(),
            questions_path: var_or("QUESTIONS_PATH", "data/questions.json").into(),
            static_dir: var_or("STATIC_DIR", "static").into(),
            login_rate_limit: parse_or("LOGIN_RATE_LIMIT", 10)?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}
