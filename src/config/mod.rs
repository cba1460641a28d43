use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Fallback secret for local development only. Production refuses to start with it.
const DEV_SESSION_SECRET: &str = "coach-admin-development-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the coach API, including its `/api` prefix.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub max_age_secs: u64,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("COACH_ADMIN_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("COACH_ADMIN_BIND_HOST") {
            self.server.bind_host = v;
        }

        // Backend overrides
        if let Ok(v) = env::var("BACKEND_BASE_URL") {
            self.backend.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BACKEND_REQUEST_TIMEOUT_SECS") {
            self.backend.request_timeout_secs = v.parse().unwrap_or(self.backend.request_timeout_secs);
        }
        if let Ok(v) = env::var("BACKEND_CONNECT_TIMEOUT_SECS") {
            self.backend.connect_timeout_secs = v.parse().unwrap_or(self.backend.connect_timeout_secs);
        }

        // Session overrides, accepting the dashboard's historical variable names
        if let Ok(v) = env::var("SESSION_SECRET").or_else(|_| env::var("NEXTAUTH_SECRET_KEY")) {
            self.session.secret = v;
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_SECS").or_else(|_| env::var("NEXT_APP_JWT_TIMEOUT")) {
            self.session.max_age_secs = v.parse().unwrap_or(self.session.max_age_secs);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_SECURE_COOKIE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Checks that must hold before the server accepts traffic.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.is_empty() {
            anyhow::bail!("SESSION_SECRET is not set");
        }
        if self.environment == Environment::Production && self.session.secret == DEV_SESSION_SECRET {
            anyhow::bail!("refusing to run in production with the development session secret");
        }
        url::Url::parse(&self.backend.base_url)
            .map_err(|e| anyhow::anyhow!("invalid BACKEND_BASE_URL '{}': {}", self.backend.base_url, e))?;
        if self.backend.request_timeout_secs == 0 || self.backend.connect_timeout_secs == 0 {
            anyhow::bail!("backend timeouts must be at least one second");
        }
        if self.security.enable_cors && self.security.cors_origins.iter().any(|o| o.trim() == "*") {
            anyhow::bail!("SECURITY_CORS_ORIGINS cannot contain '*' because session cookies need explicit origins");
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://localhost:3001/api".to_string(),
                request_timeout_secs: 30,
                connect_timeout_secs: 5,
            },
            session: SessionConfig {
                secret: DEV_SESSION_SECRET.to_string(),
                max_age_secs: 60 * 60 * 24, // 1 day
                cookie_name: "coach_admin.session-token".to_string(),
                secure_cookie: false,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://localhost:3001/api".to_string(),
                request_timeout_secs: 15,
                connect_timeout_secs: 5,
            },
            session: SessionConfig {
                secret: String::new(),
                max_age_secs: 60 * 60 * 8,
                cookie_name: "coach_admin.session-token".to_string(),
                secure_cookie: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://localhost:3001/api".to_string(),
                request_timeout_secs: 10,
                connect_timeout_secs: 3,
            },
            session: SessionConfig {
                secret: String::new(),
                max_age_secs: 60 * 60 * 4,
                cookie_name: "__Secure-coach_admin.session-token".to_string(),
                secure_cookie: true,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://admin.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
