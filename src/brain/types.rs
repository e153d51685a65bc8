//! Brain record type definitions.
//!
//! Defines [`Zone`] (positional classification bucket), [`SyncState`]
//! (lifecycle), and [`Brain`] (one discovered top-level folder).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the placeholder brain emitted when a scan finds no folders.
pub const EMPTY_BRAIN_ID: &str = "local_empty";

/// Classification bucket, assigned purely by discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    /// First discovered folder.
    Singularity,
    /// Second discovered folder.
    EventHorizon,
    /// Every folder after the second.
    DeepVoid,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Singularity, Zone::EventHorizon, Zone::DeepVoid];

    /// Zone for the folder at `index` in discovery order.
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Wire representation, as stored in the `zone` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singularity => "SINGULARITY",
            Self::EventHorizon => "EVENT_HORIZON",
            Self::DeepVoid => "DEEP_VOID",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Singularity => "Core Identity",
            Self::EventHorizon => "Working Memory",
            Self::DeepVoid => "Archive",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SINGULARITY" => Ok(Self::Singularity),
            "EVENT_HORIZON" => Ok(Self::EventHorizon),
            "DEEP_VOID" => Ok(Self::DeepVoid),
            _ => Err(format!("unknown zone: {s}")),
        }
    }
}

/// Lifecycle state of a brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// Scanned and holding files.
    Coherent,
    /// Sync in progress.
    Entangling,
    /// Empty, or post-sync verification.
    Stabilizing,
    /// Write lock held.
    Locked,
    /// Error or placeholder.
    Decoherent,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coherent => "COHERENT",
            Self::Entangling => "ENTANGLING",
            Self::Stabilizing => "STABILIZING",
            Self::Locked => "LOCKED",
            Self::Decoherent => "DECOHERENT",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered top-level folder treated as one syncable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brain {
    /// `local_<folder name>`.
    pub id: String,
    pub name: String,
    pub zone: Zone,
    /// `./<folder name>`, relative to the mounted root.
    pub local_path: String,
    /// Total bytes of all non-ignored files.
    pub mass_bytes: u64,
    /// Number of non-ignored files.
    pub neuron_count: u64,
    /// When this brain was last observed by a scan.
    pub last_pulse: DateTime<Utc>,
    pub state: SyncState,
    pub generation: u64,
    /// Reserved; always empty.
    pub peers: Vec<String>,
    pub active_lock: Option<String>,
}

impl Brain {
    /// Build a freshly scanned brain for `folder`.
    pub fn discovered(folder: &str, index: usize, mass_bytes: u64, neuron_count: u64) -> Self {
        Self {
            id: format!("local_{folder}"),
            name: folder.to_string(),
            zone: Zone::for_index(index),
            local_path: format!("./{folder}"),
            mass_bytes,
            neuron_count,
            last_pulse: Utc::now(),
            state: if neuron_count > 0 {
                SyncState::Coherent
            } else {
                SyncState::Stabilizing
            },
            generation: 1,
            peers: Vec::new(),
            active_lock: None,
        }
    }

    /// The placeholder emitted when no qualifying folders exist.
    pub fn empty_placeholder() -> Self {
        Self {
            id: EMPTY_BRAIN_ID.to_string(),
            name: "No Folders Found".to_string(),
            zone: Zone::DeepVoid,
            local_path: "./[empty]".to_string(),
            mass_bytes: 0,
            neuron_count: 0,
            last_pulse: DateTime::<Utc>::default(),
            state: SyncState::Decoherent,
            generation: 0,
            peers: Vec::new(),
            active_lock: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == EMPTY_BRAIN_ID
    }

    /// Folder name relative to the mounted root (`local_path` without `./`).
    pub fn dir_name(&self) -> &str {
        self.local_path.strip_prefix("./").unwrap_or(&self.local_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_is_positional() {
        assert_eq!(Zone::for_index(0), Zone::Singularity);
        assert_eq!(Zone::for_index(1), Zone::EventHorizon);
        assert_eq!(Zone::for_index(2), Zone::DeepVoid);
        assert_eq!(Zone::for_index(57), Zone::DeepVoid);
    }

    #[test]
    fn zone_parses_wire_and_cli_forms() {
        assert_eq!("EVENT_HORIZON".parse::<Zone>().unwrap(), Zone::EventHorizon);
        assert_eq!("deep-void".parse::<Zone>().unwrap(), Zone::DeepVoid);
        assert!("nowhere".parse::<Zone>().is_err());
    }

    #[test]
    fn discovered_state_follows_file_count() {
        let full = Brain::discovered("alpha", 0, 10, 2);
        assert_eq!(full.state, SyncState::Coherent);
        assert_eq!(full.id, "local_alpha");
        assert_eq!(full.dir_name(), "alpha");

        let empty = Brain::discovered("beta", 1, 0, 0);
        assert_eq!(empty.state, SyncState::Stabilizing);
    }

    #[test]
    fn placeholder_is_recognised_by_id() {
        let placeholder = Brain::empty_placeholder();
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.state, SyncState::Decoherent);
        assert_eq!(placeholder.generation, 0);
        assert!(!Brain::discovered("x", 0, 0, 0).is_placeholder());
    }
}
