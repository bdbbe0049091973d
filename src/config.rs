//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use maru_http::{Error, Result};

fn default_host() -> String {
	"127.0.0.1".to_string()
}

fn default_port() -> u16 {
	8124
}

/// Listening address and dispatch limits.
///
/// Deserializable with every field optional, so a partial source such as
/// `{"port": 9000}` fills the rest with defaults.
///
/// # Examples
///
/// ```
/// use maru::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.host, "127.0.0.1");
/// assert_eq!(config.port, 8124);
/// assert!(config.completion_timeout().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,

	#[serde(default = "default_port")]
	pub port: u16,

	/// Upper bound, in seconds, on waiting for deferred and template-backed
	/// responses. Unset means wait forever.
	#[serde(default)]
	pub completion_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			completion_timeout_secs: None,
		}
	}
}

impl ServerConfig {
	/// Shorthand for a loopback config on the given port.
	pub fn on_port(port: u16) -> Self {
		Self {
			port,
			..Self::default()
		}
	}

	/// The socket address to bind.
	pub fn addr(&self) -> Result<SocketAddr> {
		format!("{}:{}", self.host, self.port)
			.parse()
			.map_err(|e| {
				Error::ImproperlyConfigured(format!(
					"invalid listen address {}:{}: {e}",
					self.host, self.port
				))
			})
	}

	/// The completion timeout as a [`Duration`], when configured.
	pub fn completion_timeout(&self) -> Option<Duration> {
		self.completion_timeout_secs.map(Duration::from_secs)
	}
}
