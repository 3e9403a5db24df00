use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pending_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        // Pending registrations are held in memory until verified; see session.rs.
        let pending_ttl = env::var("PENDING_TTL_SECS")
            .ok()
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(15 * 60);
        Ok(Self {
            database_url,
            host,
            port,
            pending_ttl: Duration::from_secs(pending_ttl),
        })
    }
}
