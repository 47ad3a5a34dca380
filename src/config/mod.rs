/// Application configuration module
use std::env;
use std::time::Duration;

/// Deployment mode, controls how much error detail leaves the server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    /// Error responses carry the full error object everywhere except test mode
    pub fn exposes_error_detail(&self) -> bool {
        !matches!(self, Environment::Test)
    }
}

/// Proxy server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u64,
    pub nasa_api_url: String,
    pub nasa_api_key: String,
    pub rover_sol: u64,
    pub http_timeout: Duration,
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_u64("PORT", 3000);

        let nasa_api_url = env::var("NASA_API_URL")
            .unwrap_or_else(|_| "https://api.nasa.gov".to_string())
            .trim_end_matches('/')
            .to_string();

        let nasa_api_key = env::var("NASA_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();

        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|raw| Environment::parse(&raw))
            .unwrap_or(Environment::Development);

        if port > u64::from(u16::MAX) {
            anyhow::bail!("PORT {} is out of range", port);
        }

        Ok(Self {
            bind_addr,
            port,
            nasa_api_url,
            nasa_api_key,
            rover_sol: env_u64("ROVER_SOL", 900),
            http_timeout: Duration::from_secs(env_u64("HTTP_TIMEOUT_SECONDS", 30)),
            environment,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Dashboard client configuration
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub proxy_url: String,
    pub user_name: String,
    pub output_path: String,
    pub http_timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let proxy_url = env::var("PROXY_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            proxy_url,
            user_name: env::var("DASHBOARD_USER").unwrap_or_else(|_| "Student".to_string()),
            output_path: env::var("DASHBOARD_OUT").unwrap_or_else(|_| "dashboard.html".to_string()),
            http_timeout: Duration::from_secs(env_u64("HTTP_TIMEOUT_SECONDS", 30)),
        })
    }
}

pub(crate) fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
