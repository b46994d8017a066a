//! Lightweight network reachability probe
//!
//! Used to tell a dead website apart from a dead uplink. A probe is a single
//! TCP connect to a well-known always-on address; no data is exchanged.

use crate::config::NetworkConfig;
use crate::ConfigError;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Answers whether the machine can currently reach the wider network
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probe that opens (and immediately drops) a TCP connection
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: SocketAddr, timeout: Duration) -> Self {
        Self { address, timeout }
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, ConfigError> {
        let address = config.probe_address.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!(
                "probe-address '{}' is not a socket address: {}",
                config.probe_address, e
            ))
        })?;

        Ok(Self::new(
            address,
            Duration::from_millis(config.probe_timeout_ms),
        ))
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Connectivity probe to {} failed: {}", self.address, e);
                false
            }
            Err(_) => {
                tracing::debug!("Connectivity probe to {} timed out", self.address);
                false
            }
        }
    }
}
