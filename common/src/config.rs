use std::time::Duration;

/// Tunables for one engine run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on devices probed at the same time.
    ///
    /// Probing is independent per device, so the pool only bounds resource
    /// use; it never changes the merge result or the output order.
    pub concurrency: usize,
    /// Deadline for a single ICMP echo round-trip.
    pub ping_timeout: Duration,
    /// Deadline applied to the SSH connect, handshake and authentication.
    pub ssh_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            ping_timeout: Duration::from_secs(2),
            ssh_timeout: Duration::from_secs(10),
        }
    }
}
