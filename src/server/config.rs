//! Server configuration from environment variables.

use std::net::SocketAddr;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number.
pub const DEFAULT_PORT: u16 = 8080;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServeConfig {
    /// Loads configuration from environment variables with fallback to
    /// defaults.
    ///
    /// Environment variables:
    /// - `DOSSIER_HOST` - bind address
    /// - `DOSSIER_PORT` - bind port
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("DOSSIER_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("DOSSIER_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.port = port;
        }

        config
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns an error message when host/port do not form a valid
    /// address.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid address {}:{}: {e}", self.host, self.port))
    }

    /// Returns the full server URL.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message naming the invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port cannot be zero".to_string());
        }
        if self.host.is_empty() {
            return Err("host cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServeConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServeConfig::default();
        let addr = config
            .socket_addr()
            .unwrap_or_else(|e| panic!("default address invalid: {e}"));
        assert_eq!(addr.ip(), std::net::Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_server_url() {
        let config = ServeConfig {
            host: "localhost".to_string(),
            port: 3000,
        };
        assert_eq!(config.server_url(), "http://localhost:3000");
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let config = ServeConfig {
            port: 0,
            ..ServeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = ServeConfig {
            host: String::new(),
            ..ServeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
