use std::time::Duration;

use async_trait::async_trait;
use dtrain_core::{Deadline, LaunchConfig, LaunchError, ReadinessProbe};
use tokio::{io::AsyncReadExt, net::TcpStream, time};
use tracing::{debug, trace};

const GREETING: &[u8; 4] = b"SSH-";

/// Polls a peer until its sshd sends the protocol greeting.
#[derive(Debug, Clone)]
pub struct SshdProbe {
    connect_timeout: Duration,
    backoff: Duration,
}

impl SshdProbe {
    pub fn new(connect_timeout: Duration, backoff: Duration) -> Self {
        Self {
            connect_timeout,
            backoff,
        }
    }

    pub fn from_config(cfg: &LaunchConfig) -> Self {
        Self::new(cfg.connect_timeout, cfg.probe_backoff)
    }

    async fn attempt(&self, addr: &str, port: u16) -> std::io::Result<bool> {
        let mut stream = TcpStream::connect((addr, port)).await?;
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).await?;
        Ok(&buf == GREETING)
    }
}

impl Default for SshdProbe {
    fn default() -> Self {
        Self::from_config(&LaunchConfig::default())
    }
}

#[async_trait]
impl ReadinessProbe for SshdProbe {
    async fn check(&self, addr: &str, deadline: Deadline, port: u16) -> Result<(), LaunchError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match time::timeout(self.connect_timeout, self.attempt(addr, port)).await {
                Ok(Ok(true)) => {
                    debug!(target: "dtrain.exec.probe", addr, port, attempts, "sshd greeting received");
                    return Ok(());
                }
                Ok(Ok(false)) => trace!(target: "dtrain.exec.probe", addr, port, "unexpected greeting"),
                Ok(Err(e)) => trace!(target: "dtrain.exec.probe", addr, port, error = %e, "attempt failed"),
                Err(_) => trace!(target: "dtrain.exec.probe", addr, port, "attempt timed out"),
            }

            if deadline.is_expired() {
                debug!(target: "dtrain.exec.probe", addr, port, attempts, "giving up on peer");
                return Err(LaunchError::Connectivity {
                    addr: addr.to_string(),
                    port,
                });
            }
            time::sleep(self.backoff.min(deadline.remaining())).await;
        }
    }
}
