//! Connectivity testing core: the probe layer and the reconciliation engine.
//!
//! The two halves are strictly layered. [`probe`] performs single-shot
//! network checks with bounded timeouts and no shared state; [`engine`]
//! decides which probes each device gets for a given test mode and merges
//! the outcomes with the stored record state.

pub mod engine;
pub mod probe;
