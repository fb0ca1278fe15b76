//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default address the file server binds to
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

/// Default directory for generated data packages
pub fn default_data_package_dir() -> PathBuf {
    std::env::temp_dir().join("cot_server")
}

/// Configuration for the CoT server orchestrator
///
/// Fixed for the lifetime of an orchestrator instance. The client-facing
/// `address`/`port` pair is what gets advertised
/// inside outgoing messages; `bind_address` is where the file server actually
/// listens (same port for both).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Client-facing address advertised in outgoing messages
    pub address: String,

    /// Client-facing and bind port
    pub port: u16,

    /// Address the file server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Directory where generated data packages are stored
    #[serde(default = "default_data_package_dir")]
    pub data_package_dir: PathBuf,

    /// Timeout for outbound connect/send; `None` blocks indefinitely
    #[serde(default, with = "serde_utils::opt_duration_secs")]
    pub timeout: Option<Duration>,
}

impl ServerConfig {
    /// Create a configuration with default bind address, package directory,
    /// and no send timeout.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            bind_address: default_bind_address(),
            data_package_dir: default_data_package_dir(),
            timeout: None,
        }
    }

    /// Override the bind address
    pub fn bind_address(mut self, bind_address: impl Into<String>) -> Self {
        self.bind_address = bind_address.into();
        self
    }

    /// Override the data package directory
    pub fn data_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_package_dir = dir.into();
        self
    }

    /// Set the outbound send timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the socket address string the file server binds to
    pub fn bind_socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Whether the client-facing address is a loopback value
    ///
    /// Loopback addresses are unreachable by remote clients, so the
    /// orchestrator warns (but does not fail) when it sees one.
    pub fn is_loopback_address(&self) -> bool {
        if self.address.eq_ignore_ascii_case("localhost") {
            return true;
        }
        match self.address.parse::<IpAddr>() {
            Ok(ip) => ip.is_loopback(),
            Err(_) => false,
        }
    }
}

/// Shared serde helpers for configuration types
pub mod serde_utils {
    /// Serializes `Option<Duration>` as seconds (u64), which reads better in
    /// JSON/TOML configuration than the default `{secs, nanos}` form.
    pub mod opt_duration_secs {
        use serde::{self, Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        /// Serialize an optional Duration as seconds (u64)
        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&d.as_secs()),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional Duration from seconds (u64)
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let secs = Option::<u64>::deserialize(deserializer)?;
            Ok(secs.map(Duration::from_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("192.168.1.10", 8000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.data_package_dir, default_data_package_dir());
        assert_eq!(config.timeout, None);
        assert_eq!(config.bind_socket_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::new("192.168.1.10", 8000)
            .bind_address("127.0.0.1")
            .data_package_dir("/tmp/packages")
            .timeout(Duration::from_secs(5));
        assert_eq!(config.bind_socket_addr(), "127.0.0.1:8000");
        assert_eq!(config.data_package_dir, PathBuf::from("/tmp/packages"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_loopback_detection() {
        assert!(ServerConfig::new("localhost", 8000).is_loopback_address());
        assert!(ServerConfig::new("127.0.0.1", 8000).is_loopback_address());
        assert!(ServerConfig::new("::1", 8000).is_loopback_address());
        assert!(!ServerConfig::new("192.168.1.10", 8000).is_loopback_address());
        assert!(!ServerConfig::new("example.com", 8000).is_loopback_address());
    }

    #[test]
    fn test_timeout_serialized_as_seconds() {
        let config = ServerConfig::new("192.168.1.10", 8000).timeout(Duration::from_secs(30));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""timeout":30"#));

        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = r#"{"address":"192.168.1.10","port":8000}"#;
        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.timeout, None);
    }
}
