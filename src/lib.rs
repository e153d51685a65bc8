//! Brain folder scanner and cloud mirror for AI agent memory directories.
//!
//! A "brain" is one top-level folder of an agent's memory/context directory.
//! `memoria` discovers brains under a mounted root, classifies them into zones by
//! discovery order, and mirrors their metadata and files into a hosted backend
//! partitioned by a shareable sync code. A companion `pull` command restores a
//! brain on another machine.
//!
//! | Zone | Assigned to | Label |
//! |------|-------------|-------|
//! | **Singularity** | 1st folder | Core Identity |
//! | **Event Horizon** | 2nd folder | Working Memory |
//! | **Deep Void** | every later folder | Archive |
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`scan`] — Directory capabilities and the depth-capped, ignore-aware scanner
//! - [`brain`] — Brain records, discovery, and the registry of the latest scan
//! - [`mirror`] — Sync-code-scoped row and object storage over a pluggable backend
//! - [`sync`] — Per-brain metadata upsert and sequential file upload
//! - [`pairing`] — Sync code generation/validation and the create/join flow
//! - [`pull`] — Download a mirrored brain back onto disk
//! - [`session`] — Explicit context tying the above together
//! - [`activity`] — Timestamped activity log mirrored to `tracing`

pub mod activity;
pub mod brain;
pub mod config;
pub mod mirror;
pub mod pairing;
pub mod pull;
pub mod scan;
pub mod session;
pub mod sync;
