//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `STOREFRONT_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Settings controlling how the catalogue server starts.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Catalogue seed file; the server starts empty when unset.
    pub catalogue_path: Option<PathBuf>,
}

impl ServerSettings {
    /// Return the configured host, falling back to all interfaces.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Return the configured port, falling back to 8080.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Resolve the bind address.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the host is not an IP address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let host = self.host();
        let ip = host.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind host `{host}`: {err}"),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port()))
    }
}
