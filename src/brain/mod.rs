pub mod registry;
pub mod types;

pub use registry::{discover, BrainRegistry};
pub use types::{Brain, SyncState, Zone, EMPTY_BRAIN_ID};
