#![cfg(test)]
//! End-to-end runs through the `run_file` entry point: load a real CSV
//! inventory, reconcile it against a scripted prober, and verify what lands
//! back on disk.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use conncheck_common::config::EngineConfig;
use conncheck_common::device::{DeviceRecord, TestMode};
use conncheck_common::inventory;
use conncheck_core::engine::{self, CancelFlag};
use conncheck_core::probe::{Prober, SshOutcome};

/// Canned per-address outcomes; anything unscripted is unreachable.
#[derive(Default)]
struct ScriptedProber {
    ping: HashMap<String, bool>,
    ssh: HashMap<String, SshOutcome>,
}

impl ScriptedProber {
    fn with_ping(mut self, address: &str, answered: bool) -> Self {
        self.ping.insert(address.to_string(), answered);
        self
    }

    fn with_ssh(mut self, address: &str, outcome: SshOutcome) -> Self {
        self.ssh.insert(address.to_string(), outcome);
        self
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn ping(&self, address: &str, _timeout: Duration) -> bool {
        self.ping.get(address).copied().unwrap_or(false)
    }

    async fn ssh(
        &self,
        address: &str,
        _port: u16,
        _username: &str,
        _password: &str,
        _timeout: Duration,
    ) -> SshOutcome {
        self.ssh
            .get(address)
            .copied()
            .unwrap_or(SshOutcome::ConnectionFailed)
    }
}

fn device(name: &str, ping: bool, ssh: bool, access: bool) -> DeviceRecord {
    DeviceRecord {
        name: name.to_string(),
        address: format!("{name}.lab"),
        ping,
        port: 22,
        ssh,
        username: "ops".to_string(),
        password: "pw".to_string(),
        access,
    }
}

async fn run_against(
    path: &Path,
    mode: TestMode,
    selected: &[&str],
    prober: ScriptedProber,
) -> engine::TestRun {
    let selected: HashSet<String> = selected.iter().map(|s| s.to_string()).collect();
    engine::run_file(
        path,
        mode,
        &selected,
        Arc::new(prober),
        &EngineConfig::default(),
        CancelFlag::new(),
        None,
    )
    .await
    .expect("run_file should succeed against a valid inventory")
}

#[tokio::test]
async fn full_run_updates_the_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");

    let initial = vec![
        device("core-sw", false, true, true),
        device("edge-fw", true, false, false),
    ];
    inventory::save(&path, &initial).unwrap();

    // core-sw no longer answers ping; edge-fw answers and authenticates.
    let prober = ScriptedProber::default()
        .with_ping("edge-fw.lab", true)
        .with_ssh("edge-fw.lab", SshOutcome::AccessGranted);

    let run = run_against(&path, TestMode::All, &[], prober).await;
    assert_eq!(run.summary.tested, 2);

    let persisted = inventory::load(&path).unwrap();
    assert_eq!(persisted.len(), 2);

    // Full mode resets every stored fact about the dead device.
    let core_sw = &persisted[0];
    assert_eq!(core_sw.name, "core-sw");
    assert!(!core_sw.ping && !core_sw.ssh && !core_sw.access);

    let edge_fw = &persisted[1];
    assert!(edge_fw.ping && edge_fw.ssh && edge_fw.access);
}

#[tokio::test]
async fn filtered_run_leaves_other_rows_untouched_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");

    let initial = vec![
        device("a", true, true, true),
        device("b", false, false, false),
        device("c", true, false, false),
    ];
    inventory::save(&path, &initial).unwrap();

    let prober = ScriptedProber::default().with_ping("b.lab", true);
    let run = run_against(&path, TestMode::All, &["b"], prober).await;
    assert_eq!(run.summary.tested, 1);
    assert_eq!(run.summary.skipped, 2);

    let persisted = inventory::load(&path).unwrap();
    assert_eq!(persisted[0], initial[0]);
    assert_eq!(persisted[2], initial[2]);
    assert!(persisted[1].ping);
}

#[tokio::test]
async fn ping_run_preserves_ssh_columns_across_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");

    inventory::save(&path, &[device("gw", true, true, true)]).unwrap();

    // The host has gone dark, but a ping-only run may not erase SSH facts.
    let run = run_against(&path, TestMode::Ping, &[], ScriptedProber::default()).await;
    assert_eq!(run.summary.tested, 1);

    let persisted = inventory::load(&path).unwrap();
    assert!(!persisted[0].ping);
    assert!(persisted[0].ssh);
    assert!(persisted[0].access);
}

#[tokio::test]
async fn ssh_run_keeps_the_stored_ping_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");

    inventory::save(
        &path,
        &[device("gw", true, false, false), device("dark", false, false, false)],
    )
    .unwrap();

    let prober = ScriptedProber::default().with_ssh("gw.lab", SshOutcome::AccessDenied);
    run_against(&path, TestMode::Ssh, &[], prober).await;

    let persisted = inventory::load(&path).unwrap();

    // Authenticated handshake, rejected credentials.
    assert!(persisted[0].ping && persisted[0].ssh && !persisted[0].access);

    // Gate closed for the dark host: nothing probed, ping still false.
    assert!(!persisted[1].ping && !persisted[1].ssh && !persisted[1].access);
}

#[tokio::test]
async fn cancelled_run_rewrites_an_identical_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");

    let initial = vec![device("a", true, true, false), device("b", false, false, false)];
    inventory::save(&path, &initial).unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();

    let run = engine::run_file(
        &path,
        TestMode::All,
        &HashSet::new(),
        Arc::new(ScriptedProber::default()),
        &EngineConfig::default(),
        cancel,
        None,
    )
    .await
    .unwrap();

    assert_eq!(run.summary.tested, 0);
    assert_eq!(inventory::load(&path).unwrap(), initial);
}

#[tokio::test]
async fn missing_inventory_is_a_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");

    let result = engine::run_file(
        &path,
        TestMode::All,
        &HashSet::new(),
        Arc::new(ScriptedProber::default()),
        &EngineConfig::default(),
        CancelFlag::new(),
        None,
    )
    .await;

    assert!(result.is_err());
}
