/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
/// - `MAX_UPLOAD_BYTES`: Largest accepted upload body (default: 50 MiB)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://picstream.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `JWT_SECRET`: Secret key for JWT signing (required)
/// - `JWT_LIFETIME_SECONDS`: Access token lifetime (default: 3600)
/// - `IMAGEKIT_PRIVATE_KEY`, `IMAGEKIT_PUBLIC_KEY`, `IMAGEKIT_URL_ENDPOINT`:
///   ImageKit credentials (required; `imagekitio_private_key` and friends are
///   accepted too)
/// - `IMAGEKIT_UPLOAD_URL`: Upload API URL override
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use picstream_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use picstream_shared::media::imagekit::DEFAULT_UPLOAD_URL;
use picstream_shared::media::ImageKitConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Default CORS origins (the web client's dev server)
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Media hosting configuration
    pub imagekit: ImageKitSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in seconds
    pub lifetime_seconds: i64,
}

/// ImageKit credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct ImageKitSettings {
    pub private_key: String,
    pub public_key: String,
    pub url_endpoint: String,
    pub upload_url: String,
}

impl std::fmt::Debug for ImageKitSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageKitSettings")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("url_endpoint", &self.url_endpoint)
            .field("upload_url", &self.upload_url)
            .finish()
    }
}

impl ImageKitSettings {
    /// Client configuration for [`picstream_shared::media::ImageKitClient`]
    pub fn client_config(&self) -> ImageKitConfig {
        let mut config = ImageKitConfig::new(
            self.private_key.clone(),
            self.public_key.clone(),
            self.url_endpoint.clone(),
        );
        config.upload_url = self.upload_url.clone();
        config
    }
}

/// Reads the first variable that is set
fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

fn required_var(names: &[&str]) -> anyhow::Result<String> {
    first_var(names)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", names[0]))
}

/// Splits a comma-separated origin list
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()?;

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value.parse::<usize>()?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://picstream.db".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let lifetime_seconds = env::var("JWT_LIFETIME_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()?;

        if lifetime_seconds <= 0 {
            anyhow::bail!("JWT_LIFETIME_SECONDS must be positive");
        }

        let imagekit = ImageKitSettings {
            private_key: required_var(&["IMAGEKIT_PRIVATE_KEY", "imagekitio_private_key"])?,
            public_key: required_var(&["IMAGEKIT_PUBLIC_KEY", "imagekitio_public_key"])?,
            url_endpoint: required_var(&["IMAGEKIT_URL_ENDPOINT", "imagekitio_url"])?,
            upload_url: first_var(&["IMAGEKIT_UPLOAD_URL"])
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                max_upload_bytes,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                lifetime_seconds,
            },
            imagekit,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool configuration for [`picstream_shared::db::pool::create_pool`]
    pub fn pool_config(&self) -> picstream_shared::db::pool::DatabaseConfig {
        picstream_shared::db::pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }

    /// Configuration suitable for tests: local bind, in-memory database
    pub fn for_testing() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                lifetime_seconds: 3600,
            },
            imagekit: ImageKitSettings {
                private_key: "private_test".to_string(),
                public_key: "public_test".to_string(),
                url_endpoint: "https://ik.imagekit.io/test".to_string(),
                upload_url: DEFAULT_UPLOAD_URL.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_testing();
        config.api.port = 8000;

        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
        assert_eq!(parse_origins(DEFAULT_CORS_ORIGINS).len(), 2);
    }

    #[test]
    fn test_pool_config_carries_url() {
        let mut config = Config::for_testing();
        config.database.url = "sqlite://other.db".to_string();
        config.database.max_connections = 7;

        let pool = config.pool_config();
        assert_eq!(pool.url, "sqlite://other.db");
        assert_eq!(pool.max_connections, 7);
    }

    #[test]
    fn test_imagekit_settings() {
        let mut settings = Config::for_testing().imagekit;
        settings.upload_url = "http://127.0.0.1:9999/upload".to_string();

        let client = settings.client_config();
        assert_eq!(client.upload_url, "http://127.0.0.1:9999/upload");
        assert_eq!(client.url_endpoint, "https://ik.imagekit.io/test");

        assert!(!format!("{:?}", settings).contains("private_test"));
    }
}
