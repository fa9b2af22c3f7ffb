use std::env;

use crate::shared::validation::COLLECTION_NAME_REGEX;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub object_storage: ObjectStorageConfig,
    pub document_store: DocumentStoreConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Upper bound for upload request bodies; `None` leaves uploads unbounded
    pub max_upload_size: Option<usize>,
}

/// S3-compatible object storage settings, parsed from a single connection string
///
/// Format: `Endpoint=http://localhost:9000;AccessKey=...;SecretKey=...;Region=us-east-1;PublicEndpoint=...`
/// `Region` and `PublicEndpoint` are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStorageConfig {
    /// S3 endpoint URL used for writes
    pub endpoint: String,
    /// Endpoint used to build the resolvable object URLs handed back to clients
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Document store (Postgres) settings
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Server endpoint, e.g. `postgres://app@localhost:5432`
    pub endpoint: String,
    /// Access key, used as the connection password
    pub access_key: String,
    pub database: String,
    /// Collection holding the file documents (one table)
    pub container: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            object_storage: ObjectStorageConfig::from_env()?,
            document_store: DocumentStoreConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_PORT: u16 = 5000;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT: {}", e))?,
            Err(_) => Self::DEFAULT_PORT,
        };

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size = match env::var("MAX_UPLOAD_SIZE") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?,
            ),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_upload_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ObjectStorageConfig {
    const DEFAULT_REGION: &'static str = "us-east-1";

    pub fn from_env() -> Result<Self, String> {
        let connection_string = env::var("OBJECT_STORAGE_CONNECTION_STRING").map_err(|_| {
            "OBJECT_STORAGE_CONNECTION_STRING environment variable is required".to_string()
        })?;

        Self::from_connection_string(&connection_string)
    }

    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// Keys are matched case-insensitively; unknown keys are rejected so a typo
    /// does not silently fall back to a default.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, String> {
        let mut endpoint = None;
        let mut public_endpoint = None;
        let mut access_key = None;
        let mut secret_key = None;
        let mut region = None;

        for pair in connection_string
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Malformed connection string segment: '{}'", pair))?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "publicendpoint" => public_endpoint = Some(value),
                "accesskey" => access_key = Some(value),
                "secretkey" => secret_key = Some(value),
                "region" => region = Some(value),
                other => {
                    return Err(format!("Unknown connection string key: '{}'", other));
                }
            }
        }

        let endpoint = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .ok_or_else(|| "Connection string is missing Endpoint".to_string())?;
        let public_endpoint = public_endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.clone());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key: access_key
                .ok_or_else(|| "Connection string is missing AccessKey".to_string())?,
            secret_key: secret_key
                .ok_or_else(|| "Connection string is missing SecretKey".to_string())?,
            region: region.unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
        })
    }
}

impl DocumentStoreConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("DOCUMENT_DB_URI")
            .map_err(|_| "DOCUMENT_DB_URI environment variable is required".to_string())?;

        let access_key = env::var("DOCUMENT_DB_KEY")
            .map_err(|_| "DOCUMENT_DB_KEY environment variable is required".to_string())?;

        let database = env::var("DOCUMENT_DB_DATABASE")
            .map_err(|_| "DOCUMENT_DB_DATABASE environment variable is required".to_string())?;

        let container = env::var("DOCUMENT_DB_CONTAINER")
            .map_err(|_| "DOCUMENT_DB_CONTAINER environment variable is required".to_string())?;

        if !COLLECTION_NAME_REGEX.is_match(&container) {
            return Err(format!(
                "DOCUMENT_DB_CONTAINER '{}' must match [a-z_][a-z0-9_]*",
                container
            ));
        }

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            access_key,
            database,
            container,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Cloud File Service API".to_string());
        let version =
            env::var("SWAGGER_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Upload files and browse their metadata".to_string());

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_full() {
        let config = ObjectStorageConfig::from_connection_string(
            "Endpoint=http://minio:9000/;AccessKey=ak;SecretKey=sk;Region=eu-west-1;PublicEndpoint=https://cdn.example.com",
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://minio:9000");
        assert_eq!(config.public_endpoint, "https://cdn.example.com");
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.secret_key, "sk");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_connection_string_defaults() {
        let config = ObjectStorageConfig::from_connection_string(
            "endpoint=http://localhost:9000; accesskey=minioadmin; secretkey=minio=admin;",
        )
        .unwrap();

        assert_eq!(config.public_endpoint, "http://localhost:9000");
        assert_eq!(config.region, "us-east-1");
        // Only the first '=' separates key from value
        assert_eq!(config.secret_key, "minio=admin");
    }

    #[test]
    fn test_connection_string_rejects_missing_and_unknown_keys() {
        let missing = ObjectStorageConfig::from_connection_string("Endpoint=http://x;AccessKey=a");
        assert!(missing.unwrap_err().contains("SecretKey"));

        let unknown = ObjectStorageConfig::from_connection_string(
            "Endpoint=http://x;AccessKey=a;SecretKey=b;Bucket=other",
        );
        assert!(unknown.unwrap_err().contains("bucket"));

        let malformed = ObjectStorageConfig::from_connection_string("Endpoint");
        assert!(malformed.is_err());
    }

    #[test]
    fn test_server_address() {
        let app = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
            max_upload_size: None,
        };
        assert_eq!(app.server_address(), "0.0.0.0:5000");
    }
}
