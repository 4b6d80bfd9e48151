//! # Reconciliation Engine
//!
//! Decides, per device and per test mode, which probes run, and merges the
//! probe outcomes with the stored record state.
//!
//! Each mode is a **partial, composable probe**: a `ping` run must never
//! erase previously learned SSH facts, an `ssh` run must never touch the
//! stored ping verdict (and trusts it as its gate instead of re-pinging),
//! and only `all` recomputes every field from scratch. The merge is a pure
//! function over `(stored record, mode, probe report)` so the carry-over
//! rules live in exactly one place.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use conncheck_common::config::EngineConfig;
use conncheck_common::device::{DeviceRecord, TestMode};
use conncheck_common::inventory::{self, InventoryError};

use crate::probe::{Prober, SshOutcome};

/// Cooperative stop signal shared between a caller and a running batch.
///
/// Raising it schedules no new per-device work; in-flight probes finish or
/// time out and their results are still merged. Devices that never started
/// pass through unchanged.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Probe results for one device; `None` marks a stage the mode did not run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeReport {
    pub ping: Option<bool>,
    pub ssh: Option<SshOutcome>,
}

/// Invoked once per device as its probing completes (in completion order,
/// not input order).
pub type ProgressFn = Box<dyn Fn(&DeviceRecord) + Send + Sync>;

/// Outcome of a full engine run: the reconciled set plus run statistics.
#[derive(Debug)]
pub struct TestRun {
    /// Same length and order as the input set.
    pub records: Vec<DeviceRecord>,
    pub summary: TestSummary,
}

/// Run statistics, returned as data for the caller to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    /// Devices that were actually probed.
    pub tested: usize,
    /// Devices passed through unchanged (filtered out or cancelled).
    pub skipped: usize,
    /// Names whose SSH stage ran but ended without an SSH-layer verdict.
    pub ssh_failures: Vec<String>,
}

enum Slot {
    /// Not selected for this run; the record flows through untouched.
    Untouched(DeviceRecord),
    Probing {
        /// Returned as-is if the probe task dies; one lost probe must not
        /// lose the record or abort the batch.
        fallback: DeviceRecord,
        handle: tokio::task::JoinHandle<(DeviceRecord, Option<ProbeReport>)>,
    },
}

/// Probes the selected devices and reconciles the whole record set.
///
/// `selected` empty means "test everything". Output order always matches
/// input order; records outside the selection are returned byte-identical.
/// The engine itself never fails; probe failures are data in the merged
/// records and the summary.
pub async fn test_devices(
    records: Vec<DeviceRecord>,
    mode: TestMode,
    selected: &HashSet<String>,
    prober: Arc<dyn Prober>,
    config: &EngineConfig,
    cancel: CancelFlag,
    progress: Option<ProgressFn>,
) -> TestRun {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let progress = progress.map(Arc::new);
    let config = config.clone();

    let slots: Vec<Slot> = records
        .into_iter()
        .map(|record| {
            if !selected.is_empty() && !selected.contains(&record.name) {
                return Slot::Untouched(record);
            }

            let fallback = record.clone();
            let prober = Arc::clone(&prober);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let config = config.clone();
            let progress = progress.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (record, None);
                };
                // Checked after the permit: a raised flag stops devices that
                // have not begun, never ones already probing.
                if cancel.is_cancelled() {
                    return (record, None);
                }

                let report = probe_device(prober.as_ref(), &record, mode, &config).await;
                if let Some(progress) = progress.as_deref() {
                    progress(&record);
                }
                (record, Some(report))
            });

            Slot::Probing { fallback, handle }
        })
        .collect();

    // Index-keyed merge: slots are awaited in input order, so the output
    // sequence is independent of probe completion order.
    let mut merged = Vec::with_capacity(slots.len());
    let mut summary = TestSummary::default();

    for slot in slots {
        match slot {
            Slot::Untouched(record) => {
                summary.skipped += 1;
                merged.push(record);
            }
            Slot::Probing { fallback, handle } => match handle.await {
                Ok((record, Some(report))) => {
                    summary.tested += 1;
                    if report.ssh == Some(SshOutcome::ConnectionFailed) {
                        summary.ssh_failures.push(record.name.clone());
                    }
                    merged.push(reconcile(&record, mode, report));
                }
                Ok((record, None)) => {
                    summary.skipped += 1;
                    merged.push(record);
                }
                Err(e) => {
                    warn!("probe task for '{}' died: {e}", fallback.name);
                    summary.skipped += 1;
                    merged.push(fallback);
                }
            },
        }
    }

    TestRun {
        records: merged,
        summary,
    }
}

/// Runs the probes one device's mode calls for.
async fn probe_device(
    prober: &dyn Prober,
    record: &DeviceRecord,
    mode: TestMode,
    config: &EngineConfig,
) -> ProbeReport {
    let ping = match mode {
        TestMode::Ping | TestMode::All => {
            Some(prober.ping(&record.address, config.ping_timeout).await)
        }
        TestMode::Ssh => None,
    };

    // The gate asymmetry is load-bearing: ssh-only runs trust the *stored*
    // ping verdict, full runs gate on the fresh one.
    let ssh_due = match mode {
        TestMode::Ping => false,
        TestMode::Ssh => record.ping,
        TestMode::All => ping == Some(true),
    };

    let ssh = if ssh_due {
        debug!("attempting ssh to {}:{}", record.address, record.effective_port());
        Some(
            prober
                .ssh(
                    &record.address,
                    record.effective_port(),
                    &record.username,
                    &record.password,
                    config.ssh_timeout,
                )
                .await,
        )
    } else {
        None
    };

    ProbeReport { ping, ssh }
}

/// Merges one device's probe report with its stored state.
///
/// Starts from a fully reset status and selectively restores per mode:
/// `ping` carries the stored SSH facts through, `ssh` restores the stored
/// ping verdict, `all` keeps the reset except where probes spoke. A
/// [`SshOutcome::ConnectionFailed`] is a credential-layer non-verdict: it
/// clears `access` but leaves `ssh` wherever the earlier stages put it.
pub fn reconcile(prev: &DeviceRecord, mode: TestMode, report: ProbeReport) -> DeviceRecord {
    let mut next = DeviceRecord {
        port: prev.effective_port(),
        ping: false,
        ssh: false,
        access: false,
        ..prev.clone()
    };

    match mode {
        TestMode::Ping => {
            next.ping = report.ping.unwrap_or(false);
            next.ssh = prev.ssh;
            next.access = prev.access;
        }
        TestMode::All => {
            next.ping = report.ping.unwrap_or(false);
            apply_ssh_outcome(&mut next, report.ssh);
        }
        TestMode::Ssh => {
            next.ping = prev.ping;
            apply_ssh_outcome(&mut next, report.ssh);
        }
    }

    next
}

fn apply_ssh_outcome(next: &mut DeviceRecord, outcome: Option<SshOutcome>) {
    match outcome {
        Some(SshOutcome::AccessGranted) => {
            next.ssh = true;
            next.access = true;
        }
        Some(SshOutcome::AccessDenied) => {
            next.ssh = true;
            next.access = false;
        }
        Some(SshOutcome::ConnectionFailed) | None => {
            next.access = false;
        }
    }
}

/// One-call entry point for external callers: load the set, reconcile it,
/// write the whole result back atomically.
///
/// Probe failures are data; only persistence problems surface as errors.
pub async fn run_file(
    path: &Path,
    mode: TestMode,
    selected: &HashSet<String>,
    prober: Arc<dyn Prober>,
    config: &EngineConfig,
    cancel: CancelFlag,
    progress: Option<ProgressFn>,
) -> Result<TestRun, InventoryError> {
    let records = inventory::load(path)?;
    let run = test_devices(records, mode, selected, prober, config, cancel, progress).await;
    inventory::save(path, &run.records)?;
    Ok(run)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
