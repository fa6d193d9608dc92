//! Control-plane entity types.
//!
//! The wire mixes naming conventions (`taskUUID` next to
//! `primaryUniverseUuid`), so `rename_all = "camelCase"` is supplemented
//! with explicit renames wherever a field carries a `UUID` suffix.

use serde::{Deserialize, Serialize};

/// Unique identifier for a universe (database cluster).
pub type UniverseId = String;

/// Unique identifier for a DR config.
pub type DrConfigId = String;

/// Unique identifier for the replication stream underlying a DR config.
pub type XClusterConfigId = String;

/// Unique identifier for an asynchronous control-plane task.
pub type TaskId = String;

/// Table identifier. Differs between primary and replica for the same
/// logical table; use [`TableKey`] for cross-cluster matching.
pub type TableId = String;

/// Unique identifier for a database namespace.
pub type NamespaceId = String;

/// Unique identifier for a customer-scoped config (storage backends etc.).
pub type StorageConfigId = String;

/// Unique identifier for the customer owning the session.
pub type CustomerId = String;

// ── Session ───────────────────────────────────────────────────────

/// Current API session, used to resolve the customer id once at connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "customerUUID")]
    pub customer_uuid: CustomerId,
    #[serde(rename = "userUUID", default)]
    pub user_uuid: Option<String>,
}

// ── Tasks ─────────────────────────────────────────────────────────

/// Terminal and non-terminal states reported for a task.
///
/// Anything the control plane reports that is neither `Success` nor
/// `Failure` counts as still running; unrecognized strings are kept
/// verbatim in `Other` so matches stay exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Running,
    Success,
    Failure,
    Other(String),
}

impl From<String> for TaskState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Running" => TaskState::Running,
            "Success" => TaskState::Success,
            "Failure" => TaskState::Failure,
            _ => TaskState::Other(s),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Running => "Running".to_string(),
            TaskState::Success => "Success".to_string(),
            TaskState::Failure => "Failure".to_string(),
            TaskState::Other(s) => s,
        }
    }
}

/// Point-in-time status of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    /// Percent complete; the control plane omits it for some task types.
    #[serde(default)]
    pub percent: Option<f64>,
}

/// Accepted-action record returned by every mutating call.
///
/// Both ids are optional on the wire: a rejected or misrouted action comes
/// back without them, which callers must treat as "never started".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionAccepted {
    #[serde(rename = "taskUUID", default)]
    pub task_uuid: Option<TaskId>,
    #[serde(rename = "resourceUUID", default)]
    pub resource_uuid: Option<String>,
}

/// Detailed failure record for a task that reached `Failure`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFailureDetail {
    #[serde(rename = "failedSubTasks", default)]
    pub failed_sub_tasks: Vec<SubTaskFailure>,
}

/// One failed sub-task and its error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTaskFailure {
    #[serde(rename = "subTaskUUID", default)]
    pub sub_task_uuid: Option<TaskId>,
    #[serde(rename = "errorString")]
    pub error_string: String,
}

// ── Universes ─────────────────────────────────────────────────────

/// A database cluster instance managed by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    #[serde(rename = "universeUUID")]
    pub universe_uuid: UniverseId,
    pub name: String,
    /// DR configs in which this universe is the primary.
    #[serde(rename = "drConfigUuidsAsSource", default)]
    pub dr_config_uuids_as_source: Vec<DrConfigId>,
    /// DR configs in which this universe is the replica.
    #[serde(rename = "drConfigUuidsAsTarget", default)]
    pub dr_config_uuids_as_target: Vec<DrConfigId>,
}

// ── DR configs ────────────────────────────────────────────────────

/// Replication state of a DR config as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DrConfigState {
    Initializing,
    Replicating,
    /// Replication halted, the post-failover condition.
    Halted,
    Other(String),
}

impl From<String> for DrConfigState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Initializing" => DrConfigState::Initializing,
            "Replicating" => DrConfigState::Replicating,
            "Halted" => DrConfigState::Halted,
            _ => DrConfigState::Other(s),
        }
    }
}

impl From<DrConfigState> for String {
    fn from(state: DrConfigState) -> Self {
        match state {
            DrConfigState::Initializing => "Initializing".to_string(),
            DrConfigState::Replicating => "Replicating".to_string(),
            DrConfigState::Halted => "Halted".to_string(),
            DrConfigState::Other(s) => s,
        }
    }
}

impl Default for DrConfigState {
    fn default() -> Self {
        DrConfigState::Other(String::new())
    }
}

/// The DR relationship between one primary and one replica universe.
///
/// `tables` is the authoritative full membership. There is no notion of
/// "added" vs "original" tables; the set-tables endpoint replaces the
/// whole set on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrConfig {
    pub uuid: DrConfigId,
    #[serde(default)]
    pub name: Option<String>,
    pub primary_universe_uuid: UniverseId,
    pub dr_replica_universe_uuid: UniverseId,
    /// The underlying replication stream, target of pause/resume edits.
    #[serde(default)]
    pub xcluster_config_uuid: Option<XClusterConfigId>,
    #[serde(default)]
    pub tables: Vec<TableId>,
    pub bootstrap_params: BootstrapParams,
    #[serde(default)]
    pub state: DrConfigState,
}

impl DrConfig {
    /// Storage config backing bootstrap backup/restore for this DR config.
    pub fn storage_config_uuid(&self) -> &StorageConfigId {
        &self.bootstrap_params.backup_request_params.storage_config_uuid
    }
}

/// Bootstrap (initial full-copy) parameters of a DR config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapParams {
    pub backup_request_params: BackupRequestParams,
}

/// Backup/restore settings used during bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequestParams {
    pub parallelism: u32,
    #[serde(rename = "storageConfigUUID")]
    pub storage_config_uuid: StorageConfigId,
}

// ── Tables and namespaces ─────────────────────────────────────────

/// Table types the control plane distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    #[serde(rename = "PGSQL_TABLE_TYPE")]
    Pgsql,
    #[serde(rename = "YQL_TABLE_TYPE")]
    Yql,
    #[serde(rename = "REDIS_TABLE_TYPE")]
    Redis,
    #[serde(rename = "TRANSACTION_STATUS_TABLE_TYPE")]
    TransactionStatus,
}

/// A replicable database object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    #[serde(rename = "tableID")]
    pub table_id: TableId,
    #[serde(rename = "keySpace")]
    pub key_space: String,
    /// Absent for non-PGSQL tables.
    #[serde(rename = "pgSchemaName", default)]
    pub pg_schema_name: String,
    pub table_name: String,
    pub table_type: TableType,
    /// Approximate size; non-zero tables trigger a full bootstrap copy
    /// when added to replication.
    #[serde(default)]
    pub size_bytes: f64,
    #[serde(default)]
    pub is_index_table: bool,
}

/// Identity key for matching the same logical table across clusters.
///
/// Table ids differ between primary and replica; the (keyspace, schema,
/// name) tuple is what both sides agree on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub key_space: String,
    pub pg_schema_name: String,
    pub table_name: String,
}

impl TableInfo {
    /// The cross-cluster identity tuple for this table.
    pub fn key(&self) -> TableKey {
        TableKey {
            key_space: self.key_space.clone(),
            pg_schema_name: self.pg_schema_name.clone(),
            table_name: self.table_name.clone(),
        }
    }

    /// Human-readable `keyspace.schema.table` form for error listings.
    pub fn qualified_name(&self) -> String {
        if self.pg_schema_name.is_empty() {
            format!("{}.{}", self.key_space, self.table_name)
        } else {
            format!("{}.{}.{}", self.key_space, self.pg_schema_name, self.table_name)
        }
    }
}

/// A database namespace (database/schema) within a universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceInfo {
    #[serde(rename = "namespaceUUID")]
    pub namespace_uuid: NamespaceId,
    pub name: String,
    #[serde(rename = "tableType")]
    pub table_type: TableType,
}

// ── Customer configs ──────────────────────────────────────────────

/// A customer-scoped config entry; storage backends are `type == STORAGE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerConfig {
    #[serde(rename = "configUUID")]
    pub config_uuid: StorageConfigId,
    #[serde(rename = "configName")]
    pub config_name: String,
    #[serde(rename = "type")]
    pub config_type: String,
}

// ── Safe times ────────────────────────────────────────────────────

/// Per-namespace safe-time snapshot for a DR config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeTimes {
    #[serde(default)]
    pub safetimes: Vec<NamespaceSafeTime>,
}

/// Latest data state known to be safely consistent on the replica, for
/// one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSafeTime {
    pub namespace_id: NamespaceId,
    pub safetime_epoch_us: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_state_from_wire_strings() {
        assert_eq!(TaskState::from("Success".to_string()), TaskState::Success);
        assert_eq!(TaskState::from("Failure".to_string()), TaskState::Failure);
        assert_eq!(TaskState::from("Running".to_string()), TaskState::Running);
        assert_eq!(
            TaskState::from("Initializing".to_string()),
            TaskState::Other("Initializing".to_string())
        );
    }

    #[test]
    fn task_status_percent_defaults_to_none() {
        let status: TaskStatus = serde_json::from_str(r#"{"status": "Running"}"#).unwrap();
        assert_eq!(status.status, TaskState::Running);
        assert!(status.percent.is_none());

        let status: TaskStatus =
            serde_json::from_str(r#"{"status": "Running", "percent": 42.5}"#).unwrap();
        assert_eq!(status.percent, Some(42.5));
    }

    #[test]
    fn action_accepted_uses_uppercase_uuid_keys() {
        let accepted: ActionAccepted =
            serde_json::from_str(r#"{"taskUUID": "t-1", "resourceUUID": "r-1"}"#).unwrap();
        assert_eq!(accepted.task_uuid.as_deref(), Some("t-1"));
        assert_eq!(accepted.resource_uuid.as_deref(), Some("r-1"));

        // A rejected action comes back with neither id.
        let empty: ActionAccepted = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.task_uuid.is_none());
        assert!(empty.resource_uuid.is_none());
    }

    #[test]
    fn table_info_decodes_wire_shape() {
        // Field shape as returned by the list-tables endpoint.
        let json = r#"{
            "colocated": false,
            "isIndexTable": false,
            "keySpace": "yugabyte2",
            "pgSchemaName": "public2",
            "relationType": "USER_TABLE_RELATION",
            "sizeBytes": 0.0,
            "tableID": "00004000000030008000000000004002",
            "tableName": "foo",
            "tableType": "PGSQL_TABLE_TYPE",
            "tableUUID": "00004000-0000-3000-8000-000000004002",
            "walSizeBytes": 6291456.0
        }"#;
        let table: TableInfo = serde_json::from_str(json).unwrap();
        assert_eq!(table.table_id, "00004000000030008000000000004002");
        assert_eq!(table.table_type, TableType::Pgsql);
        assert_eq!(
            table.key(),
            TableKey {
                key_space: "yugabyte2".to_string(),
                pg_schema_name: "public2".to_string(),
                table_name: "foo".to_string(),
            }
        );
        assert_eq!(table.qualified_name(), "yugabyte2.public2.foo");
    }

    #[test]
    fn dr_config_state_round_trip() {
        assert_eq!(
            DrConfigState::from("Halted".to_string()),
            DrConfigState::Halted
        );
        let s: String = DrConfigState::Other("Updating".to_string()).into();
        assert_eq!(s, "Updating");
    }

    #[test]
    fn dr_config_decodes_and_exposes_storage_config() {
        let json = r#"{
            "uuid": "dr-1",
            "primaryUniverseUuid": "u-east",
            "drReplicaUniverseUuid": "u-central",
            "xclusterConfigUuid": "xc-1",
            "tables": ["t1", "t2"],
            "bootstrapParams": {
                "backupRequestParams": {
                    "parallelism": 8,
                    "storageConfigUUID": "s-1"
                }
            },
            "state": "Replicating"
        }"#;
        let config: DrConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.primary_universe_uuid, "u-east");
        assert_eq!(config.storage_config_uuid(), "s-1");
        assert_eq!(config.state, DrConfigState::Replicating);
        assert_eq!(config.tables, vec!["t1", "t2"]);
    }

    #[test]
    fn safe_times_decode() {
        let json = r#"{"safetimes": [
            {"namespaceId": "ns-1", "safetimeEpochUs": 1718200000000000}
        ]}"#;
        let times: SafeTimes = serde_json::from_str(json).unwrap();
        assert_eq!(times.safetimes[0].namespace_id, "ns-1");
        assert_eq!(times.safetimes[0].safetime_epoch_us, 1_718_200_000_000_000);
    }
}
