//! duplex-model: shared types for the Duplex DR automation workspace.
//!
//! All entities live in the remote control plane; these types are the
//! operation-scoped local copies the other crates pass around. Field
//! (de)serialization matches the remote wire names exactly, so a malformed
//! response fails at the decode boundary instead of deep inside an
//! operation.

pub mod types;

pub use types::*;
