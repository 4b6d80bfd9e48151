use std::path::Path;

use anyhow::bail;
use tracing::warn;

use conncheck_common::device::DeviceRecord;
use conncheck_common::inventory;
use conncheck_common::success;

use crate::commands::NewEntry;

/// Appends a device with all status fields unset; the next test run fills
/// them in.
pub fn add(file: &Path, entry: NewEntry) -> anyhow::Result<()> {
    let mut records = inventory::load(file)?;
    if records.iter().any(|record| record.name == entry.name) {
        bail!("device '{}' already exists in {}", entry.name, file.display());
    }

    let name = entry.name.clone();
    records.push(DeviceRecord {
        name: entry.name,
        address: entry.address,
        ping: false,
        port: entry.port,
        ssh: false,
        username: entry.username,
        password: entry.password,
        access: false,
    });
    inventory::save(file, &records)?;

    success!("added '{name}' to {}", file.display());
    Ok(())
}

pub fn remove(file: &Path, names: &[String]) -> anyhow::Result<()> {
    let mut records = inventory::load(file)?;
    let before = records.len();
    records.retain(|record| !names.contains(&record.name));
    let removed = before - records.len();

    if removed == 0 {
        warn!("no devices matched in {}", file.display());
        return Ok(());
    }

    inventory::save(file, &records)?;
    success!("removed {removed} device(s) from {}", file.display());
    Ok(())
}
