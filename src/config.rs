use std::env;

use crate::session::SessionBackend;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_backend: SessionBackend,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let session_backend = match env::var("SESSION_BACKEND").ok().as_deref() {
            Some("database") => SessionBackend::Database,
            Some("memory") | None => SessionBackend::Memory,
            Some(other) => anyhow::bail!("unknown SESSION_BACKEND: {other}"),
        };
        Ok(Self {
            database_url,
            host,
            port,
            session_backend,
        })
    }
}
