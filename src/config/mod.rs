use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the image filter service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port the HTTP server listens on (default: 8082)
    pub port: u16,

    /// Address the HTTP server binds to (default: "0.0.0.0")
    pub bind_address: String,

    /// Directory for per-request temporary files
    pub temp_dir: PathBuf,

    /// Maximum size of a downloaded image in bytes (default: 20 MB)
    pub max_image_size: u64,

    /// Total timeout for a single fetch attempt in seconds (default: 30)
    pub fetch_timeout_secs: u64,

    /// Connect timeout for the fetch client in seconds (default: 10)
    pub connect_timeout_secs: u64,

    /// Attempts per fetch, including the first (default: 3)
    pub fetch_max_attempts: u32,

    /// Timeout for the edge operation in seconds (default: 60)
    pub process_timeout_secs: u64,

    /// Edge backend: "builtin" or "command" (default: "builtin")
    pub edge_backend: String,

    /// Program run by the command backend
    pub edge_command: Option<String>,

    /// Extra arguments passed to the program before the input path
    pub edge_command_args: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8082,
            bind_address: "0.0.0.0".to_string(),
            temp_dir: env::temp_dir().join("image-filter-service"),
            max_image_size: 20 * 1024 * 1024, // 20 MB
            fetch_timeout_secs: 30,
            connect_timeout_secs: 10,
            fetch_max_attempts: 3,
            process_timeout_secs: 60,
            edge_backend: "builtin".to_string(),
            edge_command: None,
            edge_command_args: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            bind_address: env::var("BIND_ADDRESS").unwrap_or(default.bind_address),

            temp_dir: env::var("TEMP_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.temp_dir),

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_image_size),

            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.fetch_timeout_secs),

            connect_timeout_secs: env::var("CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.connect_timeout_secs),

            fetch_max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|attempts| *attempts > 0)
                .unwrap_or(default.fetch_max_attempts),

            process_timeout_secs: env::var("PROCESS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.process_timeout_secs),

            edge_backend: env::var("EDGE_BACKEND").unwrap_or(default.edge_backend),

            edge_command: env::var("EDGE_COMMAND")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            edge_command_args: env::var("EDGE_COMMAND_ARGS")
                .ok()
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or(default.edge_command_args),
        }
    }

    /// Create config for development (short timeouts, no retries)
    pub fn development() -> Self {
        Self {
            port: 8082,
            bind_address: "127.0.0.1".to_string(),
            temp_dir: env::temp_dir().join("image-filter-service-dev"),
            max_image_size: 20 * 1024 * 1024,
            fetch_timeout_secs: 5,
            connect_timeout_secs: 2,
            fetch_max_attempts: 1,
            process_timeout_secs: 10,
            edge_backend: "builtin".to_string(),
            edge_command: None,
            edge_command_args: Vec::new(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8082);
        assert_eq!(config.max_image_size, 20 * 1024 * 1024);
        assert_eq!(config.fetch_max_attempts, 3);
        assert_eq!(config.edge_backend, "builtin");
        assert!(config.edge_command.is_none());
    }

    #[test]
    fn test_development_config() {
        let config = ServiceConfig::development();
        assert_eq!(config.fetch_max_attempts, 1);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.process_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_env_command_backend() {
        unsafe {
            env::set_var("EDGE_BACKEND", "command");
            env::set_var("EDGE_COMMAND", "python3");
            env::set_var("EDGE_COMMAND_ARGS", "scripts/find_edges.py  --quiet");
        }
        let config = ServiceConfig::from_env();
        unsafe {
            env::remove_var("EDGE_BACKEND");
            env::remove_var("EDGE_COMMAND");
            env::remove_var("EDGE_COMMAND_ARGS");
        }
        assert_eq!(config.edge_backend, "command");
        assert_eq!(config.edge_command.as_deref(), Some("python3"));
        assert_eq!(
            config.edge_command_args,
            vec!["scripts/find_edges.py".to_string(), "--quiet".to_string()]
        );
    }
}
