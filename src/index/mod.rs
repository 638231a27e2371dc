//! Index Module
//!
//! In-memory map from key to the log offset of its latest PUT record.
//!
//! ## Responsibilities
//! - O(1) key → offset lookups for point reads
//! - Rebuild from the Append Log by full replay on startup
//! - Liveness test for merge (does the index still point here?)
//!
//! ## Data Structure Choice
//! A plain HashMap: key order is never needed, and all access is already
//! serialized by the engine's RwLock, so the index carries no lock of its
//! own. It is never persisted; the log is the only source of truth.

mod keydir;
mod replay;

pub use keydir::KeyDir;
pub use replay::{Replay, ReplayResult};
