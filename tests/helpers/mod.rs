#![allow(dead_code)]

use std::sync::Arc;

use memoria::mirror::{MemoryBackend, MirrorClient};
use memoria::scan::MemoryDir;

pub const CODE: &str = "ABC-2345-DEFG";

/// A mirror client over a fresh in-memory backend. The backend is returned too
/// so tests can inspect stored objects or inject failures.
pub fn memory_mirror() -> (MirrorClient, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let client = MirrorClient::new(backend.clone());
    (client, backend)
}

/// A root with three brains:
///
/// - `alpha`: `notes.md` (5 bytes), `deep/idea.txt` (3 bytes), plus ignored entries
/// - `beta`: `plan.md` (4 bytes)
/// - `gamma`: empty
pub fn sample_root() -> MemoryDir {
    MemoryDir::new("root")
        .dir(
            MemoryDir::new("alpha")
                .file("notes.md", "hello")
                .file(".DS_Store", "junk")
                .dir(MemoryDir::new("deep").file("idea.txt", "abc"))
                .dir(MemoryDir::new(".git").file("HEAD", "ref: refs/heads/main")),
        )
        .dir(MemoryDir::new("beta").file("plan.md", "plan"))
        .dir(MemoryDir::new("gamma"))
}

/// Object key under the shared test code.
pub fn key(brain: &str, path: &str) -> String {
    memoria::mirror::object_key(CODE, brain, path)
}
