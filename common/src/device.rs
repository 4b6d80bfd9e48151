//! # Device Record Model
//!
//! One row per managed device, as persisted in the inventory file.
//!
//! The three status booleans (`ping`, `ssh`, `access`) are last-known facts
//! from previous test runs; the derived [`ConnectivityClass`] is computed on
//! demand and never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Fallback port used whenever a record carries no usable SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// A single managed device and its last-known reachability state.
///
/// Field order matters: it is the persisted column order
/// (`Name, IP, Ping, Port, SSH, Username, Password, Access`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique key within the record set.
    #[serde(rename = "Name")]
    pub name: String,
    /// Hostname or IP address.
    #[serde(rename = "IP")]
    pub address: String,
    /// Last-known ICMP echo reachability.
    #[serde(rename = "Ping", deserialize_with = "de_flag")]
    pub ping: bool,
    /// SSH port; blank or missing cells load as 22.
    #[serde(rename = "Port", default = "default_port", deserialize_with = "de_port")]
    pub port: u16,
    /// Last-known SSH-layer reachability (handshake completed, regardless of
    /// credential validity).
    #[serde(rename = "SSH", deserialize_with = "de_flag")]
    pub ssh: bool,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    /// Last-known credential acceptance.
    #[serde(rename = "Access", deserialize_with = "de_flag")]
    pub access: bool,
}

impl DeviceRecord {
    /// The port probes should actually dial: zero counts as unset.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 { DEFAULT_SSH_PORT } else { self.port }
    }

    pub fn connectivity(&self) -> ConnectivityClass {
        classify(self.ping, self.ssh, self.access)
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// Ports arrive as free text from hand-edited files; blank means "use 22".
fn de_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_SSH_PORT);
    }
    trimmed
        .parse()
        .map_err(|e| serde::de::Error::custom(format!("invalid port '{trimmed}': {e}")))
}

/// Accepts the canonical `true`/`false` tokens plus the capitalized and
/// numeric spellings older tooling wrote; blank cells read as `false`.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" => Ok(false),
        s if s.eq_ignore_ascii_case("true") || s == "1" => Ok(true),
        s if s.eq_ignore_ascii_case("false") || s == "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

/// Which probes a test run performs.
///
/// Each mode is a partial probe with its own carry-over rules; see the engine
/// for the merge semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestMode {
    /// Ping every selected device, then attempt SSH against the reachable ones.
    #[default]
    All,
    /// Ping only; stored SSH facts are carried through untouched.
    Ping,
    /// SSH only, gated on the stored ping verdict; the ping field is untouched.
    Ssh,
}

impl TestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestMode::All => "all",
            TestMode::Ping => "ping",
            TestMode::Ssh => "ssh",
        }
    }
}

impl FromStr for TestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TestMode::All),
            "ping" => Ok(TestMode::Ping),
            "ssh" => Ok(TestMode::Ssh),
            _ => Err(format!("invalid test mode '{s}' (expected all, ping or ssh)")),
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reachability tier derived from the status booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityClass {
    NoPing,
    PingOnly,
    PingPlusSsh,
    FullAccess,
    /// Defined fallback for state combinations no boolean triple produces;
    /// kept so non-boolean sources stay classifiable rather than erroring.
    Unknown,
}

impl ConnectivityClass {
    /// Display order for summaries, best tier first.
    pub const ALL: [ConnectivityClass; 5] = [
        ConnectivityClass::FullAccess,
        ConnectivityClass::PingPlusSsh,
        ConnectivityClass::PingOnly,
        ConnectivityClass::NoPing,
        ConnectivityClass::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityClass::NoPing => "No Ping",
            ConnectivityClass::PingOnly => "Ping Only",
            ConnectivityClass::PingPlusSsh => "Ping + SSH",
            ConnectivityClass::FullAccess => "Full Access",
            ConnectivityClass::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConnectivityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a status triple to its tier. Ping is checked first, so an externally
/// edited `SSH=true, Ping=false` row still classifies as `NoPing`.
pub fn classify(ping: bool, ssh: bool, access: bool) -> ConnectivityClass {
    match (ping, ssh, access) {
        (false, _, _) => ConnectivityClass::NoPing,
        (true, false, _) => ConnectivityClass::PingOnly,
        (true, true, false) => ConnectivityClass::PingPlusSsh,
        (true, true, true) => ConnectivityClass::FullAccess,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
