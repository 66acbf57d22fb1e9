use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub notifier: NotifierConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    pub api_base: String,
    pub bot_token: String,
}

/// Cadence of the background jobs. Polling is the only freshness
/// guarantee the service makes.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    pub score_sync_interval_secs: u64,
    pub completion_interval_secs: u64,
    pub reminder_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            admin_token: env::var("ADMIN_TOKEN")
                .context("ADMIN_TOKEN must be set")?,
        };

        let feed = FeedConfig {
            base_url: env::var("FEED_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.espn.com/core/nfl/schedule".to_string()),
            timeout_secs: env::var("FEED_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        let notifier = NotifierConfig {
            api_base: env::var("CHAT_API_BASE")
                .unwrap_or_else(|_| "https://slack.com/api".to_string()),
            bot_token: env::var("CHAT_BOT_TOKEN")
                .context("CHAT_BOT_TOKEN must be set")?,
        };

        let jobs = JobsConfig {
            score_sync_interval_secs: env::var("SCORE_SYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            completion_interval_secs: env::var("COMPLETION_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            reminder_interval_secs: env::var("REMINDER_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
        };

        Ok(Config {
            database,
            server,
            feed,
            notifier,
            jobs,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
