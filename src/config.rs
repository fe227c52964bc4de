use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration
///
/// Built once at startup and shared read-only with every connection task.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Network configuration
    pub listen_address: String,
    pub port: u16,
    pub backlog_size: u32,

    // Directory the /files/ routes operate under
    pub directory: Option<PathBuf>,

    // Connection settings
    pub read_timeout: Duration,
    pub write_timeout: Duration,

    // HTTP configuration
    pub max_header_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: 4221,
            backlog_size: 1024,

            directory: None,

            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(30),

            max_header_size: 16 * 1024, // 16 KB
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address and port to listen on
    pub fn with_address(mut self, address: &str, port: u16) -> Self {
        self.listen_address = address.to_string();
        self.port = port;
        self
    }

    /// Set the serving directory for file routes
    pub fn with_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Set the deadline for reading the request head and the request body
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the deadline for writing a response
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the maximum size of the request line plus headers
    pub fn with_max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    /// Get the full address string (address:port)
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.listen_address, self.port)
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.socket_address(), "0.0.0.0:4221");
        assert!(config.directory().is_none());
        assert_eq!(config.max_header_size, 16 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new()
            .with_address("127.0.0.1", 0)
            .with_directory("/tmp/served")
            .with_read_timeout(Duration::from_millis(250));

        assert_eq!(config.socket_address(), "127.0.0.1:0");
        assert_eq!(config.directory(), Some(Path::new("/tmp/served")));
        assert_eq!(config.read_timeout, Duration::from_millis(250));
    }
}
