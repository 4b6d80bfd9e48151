//! Inventory persistence.
//!
//! The record set is one flat CSV file with a fixed column order
//! (`Name, IP, Ping, Port, SSH, Username, Password, Access`). Persistence is
//! whole-set: a run either replaces the entire file or leaves it untouched,
//! so readers never observe a half-written inventory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::device::DeviceRecord;

/// Persisted column order; also written explicitly when the set is empty,
/// since serde-driven writers only emit headers alongside a first record.
const COLUMNS: [&str; 8] = [
    "Name", "IP", "Ping", "Port", "SSH", "Username", "Password", "Access",
];

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read inventory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write inventory {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("duplicate device name '{name}' in {path}")]
    DuplicateName { path: PathBuf, name: String },
}

/// Loads the whole record set, preserving file order.
///
/// Device names must be unique; ports must parse as integers (blank cells
/// load as 22). Anything else is a [`InventoryError::Malformed`] row, fatal
/// to the load.
pub fn load(path: &Path) -> Result<Vec<DeviceRecord>, InventoryError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| read_failure(path, e))?;

    let mut records: Vec<DeviceRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for row in reader.deserialize() {
        let record: DeviceRecord = row.map_err(|e| read_failure(path, e))?;
        if !seen.insert(record.name.clone()) {
            return Err(InventoryError::DuplicateName {
                path: path.to_path_buf(),
                name: record.name,
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Replaces the record set on disk with `records`.
///
/// The set is serialized to a temporary file in the same directory and
/// renamed over the original, so a failure part-way leaves the previous
/// inventory intact.
pub fn save(path: &Path, records: &[DeviceRecord]) -> Result<(), InventoryError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| InventoryError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        if records.is_empty() {
            writer
                .write_record(COLUMNS)
                .map_err(|e| write_failure(path, e))?;
        }
        for record in records {
            writer.serialize(record).map_err(|e| write_failure(path, e))?;
        }
        writer.flush().map_err(|source| InventoryError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    tmp.persist(path).map_err(|e| InventoryError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn read_failure(path: &Path, e: csv::Error) -> InventoryError {
    let reason = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(source) => InventoryError::Read {
            path: path.to_path_buf(),
            source,
        },
        _ => InventoryError::Malformed {
            path: path.to_path_buf(),
            reason,
        },
    }
}

fn write_failure(path: &Path, e: csv::Error) -> InventoryError {
    let reason = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(source) => InventoryError::Write {
            path: path.to_path_buf(),
            source,
        },
        _ => InventoryError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::other(reason),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DEFAULT_SSH_PORT;
    use std::io::Write as _;

    fn record(name: &str, port: u16) -> DeviceRecord {
        DeviceRecord {
            name: name.to_string(),
            address: format!("{name}.example.net"),
            ping: true,
            port,
            ssh: true,
            username: "ops".to_string(),
            password: "hunter2".to_string(),
            access: false,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");

        let records = vec![record("edge-1", 22), record("edge-2", 2222)];
        save(&path, &records).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, records);

        // A second round trip must not disturb any field.
        save(&path, &loaded).unwrap();
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn empty_set_round_trips_through_a_headed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");

        save(&path, &[]).unwrap();
        assert_eq!(load(&path).unwrap(), Vec::<DeviceRecord>::new());
    }

    #[test]
    fn header_has_the_fixed_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        save(&path, &[record("edge-1", 22)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, "Name,IP,Ping,Port,SSH,Username,Password,Access");
    }

    #[test]
    fn blank_port_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Name,IP,Ping,Port,SSH,Username,Password,Access").unwrap();
        writeln!(file, "edge-1,10.0.0.1,True,,False,ops,pw,False").unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded[0].port, DEFAULT_SSH_PORT);
        assert!(loaded[0].ping);
        assert!(!loaded[0].ssh);
    }

    #[test]
    fn non_numeric_port_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Name,IP,Ping,Port,SSH,Username,Password,Access").unwrap();
        writeln!(file, "edge-1,10.0.0.1,true,twenty,false,ops,pw,false").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, InventoryError::Malformed { .. }), "{err}");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.csv");
        save(&path, &[record("edge-1", 22), record("edge-1", 23)]).unwrap();

        let err = load(&path).unwrap_err();
        match err {
            InventoryError::DuplicateName { name, .. } => assert_eq!(name, "edge-1"),
            other => panic!("expected DuplicateName, got {other}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, InventoryError::Read { .. }), "{err}");
    }
}
