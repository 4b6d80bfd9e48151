//! The **abstraction** over single-device network checks.
//!
//! The engine depends on the [`Prober`] trait rather than on concrete probe
//! code, so test runs can be driven against scripted outcomes with no
//! network at all. [`NetProber`] is the real implementation: ICMP echo plus
//! an SSH password authentication attempt, each with a bounded deadline and
//! nothing shared between devices.

use std::time::Duration;

use async_trait::async_trait;

pub mod ping;
pub mod ssh;

/// Result of one SSH authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SshOutcome {
    /// Handshake and password authentication both succeeded.
    AccessGranted,
    /// Handshake succeeded; the server rejected the credentials.
    AccessDenied,
    /// No SSH-layer verdict: connect, handshake or transport failed.
    ConnectionFailed,
}

/// Single-device reachability checks.
///
/// Probe failures are expected outcomes, not faults: `ping` maps every
/// failure path to `false`, `ssh` to [`SshOutcome::ConnectionFailed`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// One ICMP echo; `true` iff the host answered within `timeout`.
    async fn ping(&self, address: &str, timeout: Duration) -> bool;

    /// One SSH handshake + password authentication against `address:port`.
    async fn ssh(
        &self,
        address: &str,
        port: u16,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> SshOutcome;
}

/// Probes real hosts over the wire.
pub struct NetProber;

#[async_trait]
impl Prober for NetProber {
    async fn ping(&self, address: &str, timeout: Duration) -> bool {
        ping::icmp_echo(address, timeout).await
    }

    async fn ssh(
        &self,
        address: &str,
        port: u16,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> SshOutcome {
        ssh::authenticate(address, port, username, password, timeout).await
    }
}
