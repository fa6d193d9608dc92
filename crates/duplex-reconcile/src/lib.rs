//! duplex-reconcile: table-set reconciliation for DR membership.
//!
//! The set-tables endpoint replaces membership wholesale; there is no
//! incremental add/remove. Every function here therefore produces or
//! validates the *complete* desired set, and callers must feed it
//! membership fetched immediately beforehand. Omitting a previously
//! included id from a submitted set silently drops that table from
//! replication.
//!
//! No I/O happens in this crate; callers supply already-fetched data.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use duplex_model::{TableId, TableInfo, TableKey};

/// Validation failures surfaced before any mutating submission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    /// None of the requested tables are available to add.
    #[error("no matching tables to add to the DR config")]
    NothingToAdd,

    /// Removing the requested ids would leave membership unchanged.
    #[error("no tables could be removed from the DR config")]
    NothingToRemove,

    /// Candidates have no `(keyspace, schema, name)` match on the replica.
    /// Replication cannot target a table that does not already exist there.
    #[error("tables missing on the DR replica: {}", tables.join(", "))]
    MissingOnReplica { tables: Vec<String> },
}

/// Tables of the universe that are not yet part of the DR membership.
///
/// Input order of `all` is preserved.
pub fn available_tables(all: &[TableInfo], current: &[TableId]) -> Vec<TableInfo> {
    let member_ids: HashSet<&str> = current.iter().map(String::as_str).collect();
    all.iter()
        .filter(|t| !member_ids.contains(t.table_id.as_str()))
        .cloned()
        .collect()
}

/// Narrow candidates to the ids the operator asked for.
///
/// An empty result means nothing the operator named can actually be added
/// (already replicated, or not present in the universe) and the caller
/// must not proceed to submission.
pub fn filter_requested(
    candidates: &[TableInfo],
    requested: &BTreeSet<TableId>,
) -> Result<Vec<TableInfo>, ReconcileError> {
    let filtered: Vec<TableInfo> = candidates
        .iter()
        .filter(|t| requested.contains(&t.table_id))
        .cloned()
        .collect();
    if filtered.is_empty() {
        return Err(ReconcileError::NothingToAdd);
    }
    Ok(filtered)
}

/// Check that every candidate exists on the replica.
///
/// Identity is the `(keyspace, schema, name)` tuple; table ids differ
/// between the two universes and cannot be compared. Schema compatibility
/// beyond existence stays the operator's responsibility.
pub fn validate_on_replica(
    candidates: &[TableInfo],
    replica_tables: &[TableInfo],
) -> Result<(), ReconcileError> {
    let replica_keys: HashSet<TableKey> = replica_tables.iter().map(TableInfo::key).collect();
    let missing: Vec<String> = candidates
        .iter()
        .filter(|t| !replica_keys.contains(&t.key()))
        .map(TableInfo::qualified_name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReconcileError::MissingOnReplica { tables: missing })
    }
}

/// Full desired set after adding validated candidates: current membership
/// followed by the new ids, deduplicated.
pub fn add_set(current: &[TableId], additions: &[TableInfo]) -> Vec<TableId> {
    let mut seen: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut desired = current.to_vec();
    for table in additions {
        if seen.insert(table.table_id.as_str()) {
            desired.push(table.table_id.clone());
        }
    }
    desired
}

/// Full desired set after removing the requested ids: current minus
/// requested.
///
/// If nothing was actually removed (none of the requested ids were
/// members), the submission would be a no-op replace and is rejected.
pub fn remove_set(
    current: &[TableId],
    requested: &BTreeSet<TableId>,
) -> Result<Vec<TableId>, ReconcileError> {
    let remaining: Vec<TableId> = current
        .iter()
        .filter(|id| !requested.contains(*id))
        .cloned()
        .collect();
    if remaining.len() == current.len() {
        return Err(ReconcileError::NothingToRemove);
    }
    Ok(remaining)
}
