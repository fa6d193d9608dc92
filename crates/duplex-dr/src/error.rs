//! Error types for DR orchestration.

use thiserror::Error;

use duplex_client::ClientError;
use duplex_reconcile::ReconcileError;
use duplex_task::TaskError;

/// Errors surfaced by orchestrator operations.
///
/// Preconditions are validated eagerly, before any mutating remote call,
/// so a failed precondition never leaves partial remote state behind.
#[derive(Debug, Error)]
pub enum DrError {
    #[error("universe '{0}' was not found")]
    UniverseNotFound(String),

    #[error("universe '{0}' does not have a DR config")]
    DrConfigNotFound(String),

    #[error("database namespace(s) not found in universe '{universe}': {names}")]
    NamespaceNotFound { universe: String, names: String },

    #[error("storage config not found: {0}")]
    StorageConfigNotFound(String),

    /// An operation's precondition is violated by existing remote state.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ReconcileError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
