//! Brain discovery and the in-memory registry of the latest scan.

use super::types::{Brain, Zone};
use crate::scan::{self, DirHandle, EntryKind, ScanError};

/// Discover brains under `root`.
///
/// Every immediate child directory (except dot-prefixed names and `node_modules`)
/// becomes one brain, zoned by its position among the brains produced. A child
/// that fails to scan is logged and skipped. When nothing qualifies the result is
/// a single placeholder brain, never an empty list.
pub async fn discover(root: &dyn DirHandle) -> Result<Vec<Brain>, ScanError> {
    let entries = root.list().await?;
    let mut brains = Vec::new();

    for entry in entries {
        if entry.kind != EntryKind::Directory {
            continue;
        }
        let folder = entry.name;
        if folder.starts_with('.') || folder == "node_modules" {
            continue;
        }

        let stats = match root.open_dir(&folder).await {
            Ok(handle) => scan::scan_stats(handle.as_ref()).await,
            Err(e) => Err(e),
        };

        match stats {
            Ok(stats) => {
                let brain = Brain::discovered(&folder, brains.len(), stats.total_bytes, stats.file_count);
                tracing::debug!(
                    brain = %brain.name,
                    zone = %brain.zone,
                    bytes = stats.total_bytes,
                    files = stats.file_count,
                    "brain discovered"
                );
                brains.push(brain);
            }
            Err(e) => {
                tracing::warn!(folder = %folder, error = %e, "failed to scan folder");
            }
        }
    }

    if brains.is_empty() {
        brains.push(Brain::empty_placeholder());
    }

    tracing::info!(count = brains.len(), root = %root.name(), "local storage scanned");
    Ok(brains)
}

/// The brains produced by the most recent scan. Every scan replaces the contents.
#[derive(Debug, Default, Clone)]
pub struct BrainRegistry {
    brains: Vec<Brain>,
}

impl BrainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry wholesale with a new scan result.
    pub fn replace(&mut self, brains: Vec<Brain>) {
        self.brains = brains;
    }

    pub fn brains(&self) -> &[Brain] {
        &self.brains
    }

    pub fn get(&self, id: &str) -> Option<&Brain> {
        self.brains.iter().find(|b| b.id == id)
    }

    /// True when the last scan found no qualifying folders.
    pub fn is_empty_result(&self) -> bool {
        matches!(self.brains.as_slice(), [only] if only.is_placeholder())
    }

    /// Brains whose name or local path contains `query` (case-insensitive),
    /// optionally restricted to `zone`.
    pub fn filter(&self, query: &str, zone: Option<Zone>) -> Vec<&Brain> {
        let needle = query.to_lowercase();
        self.brains
            .iter()
            .filter(|b| {
                needle.is_empty()
                    || b.name.to_lowercase().contains(&needle)
                    || b.local_path.to_lowercase().contains(&needle)
            })
            .filter(|b| zone.map_or(true, |z| b.zone == z))
            .collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.brains.iter().map(|b| b.mass_bytes).sum()
    }

    pub fn total_files(&self) -> u64 {
        self.brains.iter().map(|b| b.neuron_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BrainRegistry {
        let mut registry = BrainRegistry::new();
        registry.replace(vec![
            Brain::discovered("Alpha", 0, 100, 2),
            Brain::discovered("beta-notes", 1, 50, 1),
            Brain::discovered("gamma", 2, 0, 0),
        ]);
        registry
    }

    #[test]
    fn filter_by_query_is_case_insensitive() {
        let registry = sample();
        let hits = registry.filter("ALPHA", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Alpha");

        // matches local path too
        assert_eq!(registry.filter("./beta", None).len(), 1);
        assert_eq!(registry.filter("", None).len(), 3);
    }

    #[test]
    fn filter_by_zone() {
        let registry = sample();
        let hits = registry.filter("", Some(Zone::DeepVoid));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "gamma");
        assert!(registry.filter("alpha", Some(Zone::DeepVoid)).is_empty());
    }

    #[test]
    fn replace_discards_previous_scan() {
        let mut registry = sample();
        assert_eq!(registry.total_bytes(), 150);
        assert_eq!(registry.total_files(), 3);

        registry.replace(vec![Brain::empty_placeholder()]);
        assert!(registry.is_empty_result());
        assert!(registry.get("local_Alpha").is_none());
    }
}
