//! duplex-dr: orchestration of DR lifecycle operations.
//!
//! Each operation is a precondition check, a submit, and a wait through
//! the task monitor. The orchestrator owns no persistent state: every
//! entity is fetched fresh from the control plane at the start of the
//! operation, and table membership in particular is re-fetched
//! immediately before any reconciliation to narrow the window against
//! concurrent out-of-band changes.
//!
//! Operations against the same DR config must be serialized by the
//! caller; the control plane permits one in-flight mutating task per
//! resource and this crate adds no locking or idempotency keys of its
//! own.

pub mod error;
pub mod orchestrator;
pub mod storage;

pub use error::DrError;
pub use orchestrator::{CreateDrParams, DEFAULT_PARALLELISM, DrOrchestrator};
pub use storage::{StorageConfigChoice, select_storage_config};
