//! The logical control-plane operations the core consumes.
//!
//! Split in two: [`TaskApi`] is the small surface the task monitor polls,
//! [`PlatformApi`] adds everything the orchestrator needs. [`HttpClient`]
//! implements both; tests substitute in-memory fakes.
//!
//! [`HttpClient`]: crate::http::HttpClient

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::Serialize;

use duplex_model::{
    ActionAccepted, CustomerConfig, DrConfig, DrConfigId, NamespaceId, NamespaceInfo, SafeTimes,
    StorageConfigId, TableInfo, TableType, TaskFailureDetail, TaskId, TaskStatus, Universe,
    UniverseId, XClusterConfigId,
};

use crate::error::ClientResult;

/// Task status/failure queries, polled by the task monitor.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Current status of a task.
    async fn task_status(&self, task: &TaskId) -> ClientResult<TaskStatus>;

    /// Detailed failure record for a task in terminal `Failure` state.
    async fn task_failure(&self, task: &TaskId) -> ClientResult<TaskFailureDetail>;
}

/// Everything the DR orchestrator consumes.
#[async_trait]
pub trait PlatformApi: TaskApi {
    /// Universes matching a friendly name (the API treats name as a filter,
    /// so zero or more entries come back).
    async fn universes_by_name(&self, name: &str) -> ClientResult<Vec<Universe>>;

    /// A DR config by id.
    async fn dr_config(&self, id: &DrConfigId) -> ClientResult<DrConfig>;

    /// Customer configs of type `STORAGE`.
    async fn storage_configs(&self) -> ClientResult<Vec<CustomerConfig>>;

    /// Tables of a universe, filtered.
    async fn list_tables(
        &self,
        universe: &UniverseId,
        filter: &TableFilter,
    ) -> ClientResult<Vec<TableInfo>>;

    /// Database namespaces of a universe, filtered by table type.
    async fn list_namespaces(
        &self,
        universe: &UniverseId,
        table_type: TableType,
    ) -> ClientResult<Vec<NamespaceInfo>>;

    /// Per-namespace safe times for a DR config.
    async fn dr_safe_times(&self, dr: &DrConfigId) -> ClientResult<SafeTimes>;

    /// Submit creation of a DR config.
    async fn create_dr_config(&self, req: &CreateDrRequest) -> ClientResult<ActionAccepted>;

    /// Submit deletion of a DR config.
    async fn delete_dr_config(&self, dr: &DrConfigId, force: bool)
    -> ClientResult<ActionAccepted>;

    /// Submit whole-set replacement of a DR config's table membership.
    async fn set_dr_tables(
        &self,
        dr: &DrConfigId,
        req: &SetTablesRequest,
    ) -> ClientResult<ActionAccepted>;

    /// Submit a planned role exchange.
    async fn switchover(
        &self,
        dr: &DrConfigId,
        req: &SwitchoverRequest,
    ) -> ClientResult<ActionAccepted>;

    /// Submit an unplanned promotion of the replica.
    async fn failover(&self, dr: &DrConfigId, req: &FailoverRequest)
    -> ClientResult<ActionAccepted>;

    /// Submit a post-failover restart/bootstrap of the DR config.
    async fn restart_dr_config(
        &self,
        dr: &DrConfigId,
        dbs: &[NamespaceId],
        force: bool,
    ) -> ClientResult<ActionAccepted>;

    /// Submit a sync reconciling DR-tracked state with out-of-band changes.
    async fn sync_dr_config(&self, dr: &DrConfigId) -> ClientResult<ActionAccepted>;

    /// Edit the underlying replication stream (pause/resume).
    async fn set_replication_state(
        &self,
        xcluster: &XClusterConfigId,
        state: ReplicationState,
    ) -> ClientResult<ActionAccepted>;
}

// ── Query filters ─────────────────────────────────────────────────

/// Filter for [`PlatformApi::list_tables`].
#[derive(Debug, Clone)]
pub struct TableFilter {
    pub table_type: TableType,
    /// Only tables the control plane supports for replication.
    pub only_supported: bool,
    /// Restrict to these keyspaces; `None` keeps everything.
    pub include_keyspaces: Option<BTreeSet<String>>,
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            table_type: TableType::Pgsql,
            only_supported: true,
            include_keyspaces: None,
        }
    }
}

impl TableFilter {
    /// Whether a table passes this filter.
    pub fn matches(&self, table: &TableInfo) -> bool {
        if table.table_type != self.table_type {
            return false;
        }
        match &self.include_keyspaces {
            Some(keyspaces) => keyspaces.contains(&table.key_space),
            None => true,
        }
    }
}

// ── Request payloads ──────────────────────────────────────────────

/// Payload for DR config creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDrRequest {
    pub name: String,
    #[serde(rename = "sourceUniverseUUID")]
    pub source_universe_uuid: UniverseId,
    #[serde(rename = "targetUniverseUUID")]
    pub target_universe_uuid: UniverseId,
    /// Namespace ids to include in replication.
    pub dbs: Vec<NamespaceId>,
    pub bootstrap_params: BootstrapRequest,
    pub dry_run: bool,
}

impl CreateDrRequest {
    /// Conventional payload for a new source→target relationship.
    pub fn new(
        source_universe_uuid: UniverseId,
        target_universe_uuid: UniverseId,
        dbs: Vec<NamespaceId>,
        storage_config_uuid: StorageConfigId,
        parallelism: u32,
        dry_run: bool,
    ) -> Self {
        Self {
            name: format!("DR-config-{source_universe_uuid}-to-{target_universe_uuid}"),
            source_universe_uuid,
            target_universe_uuid,
            dbs,
            bootstrap_params: BootstrapRequest::new(storage_config_uuid, parallelism),
            dry_run,
        }
    }
}

/// Bootstrap parameters submitted with create and set-tables.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapRequest {
    pub backup_request_params: BackupRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest {
    pub parallelism: u32,
    #[serde(rename = "storageConfigUUID")]
    pub storage_config_uuid: StorageConfigId,
}

impl BootstrapRequest {
    pub fn new(storage_config_uuid: StorageConfigId, parallelism: u32) -> Self {
        Self {
            backup_request_params: BackupRequest {
                parallelism,
                storage_config_uuid,
            },
        }
    }
}

/// Payload for whole-set table membership replacement.
///
/// `tables` must always carry the complete desired membership; the
/// endpoint replaces the set wholesale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTablesRequest {
    pub auto_include_index_tables: bool,
    pub bootstrap_params: BootstrapRequest,
    pub tables: Vec<String>,
}

/// Payload for a planned switchover.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchoverRequest {
    pub primary_universe_uuid: UniverseId,
    pub dr_replica_universe_uuid: UniverseId,
}

/// Payload for an unplanned failover. The safe-time map bounds the
/// data-loss window per namespace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverRequest {
    pub primary_universe_uuid: UniverseId,
    pub dr_replica_universe_uuid: UniverseId,
    pub namespace_id_safetime_epoch_us_map: BTreeMap<NamespaceId, i64>,
}

/// Desired state of the underlying replication stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationState {
    Paused,
    Running,
}

impl ReplicationState {
    /// Wire value for the replication edit endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ReplicationState::Paused => "Paused",
            ReplicationState::Running => "Running",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: &str, keyspace: &str, table_type: TableType) -> TableInfo {
        TableInfo {
            table_id: id.to_string(),
            key_space: keyspace.to_string(),
            pg_schema_name: "public".to_string(),
            table_name: format!("table_{id}"),
            table_type,
            size_bytes: 0.0,
            is_index_table: false,
        }
    }

    #[test]
    fn filter_matches_type_and_keyspace() {
        let filter = TableFilter {
            include_keyspaces: Some(BTreeSet::from(["app".to_string()])),
            ..TableFilter::default()
        };
        assert!(filter.matches(&table("t1", "app", TableType::Pgsql)));
        assert!(!filter.matches(&table("t2", "other", TableType::Pgsql)));
        assert!(!filter.matches(&table("t3", "app", TableType::Yql)));
    }

    #[test]
    fn create_request_serializes_uuid_keys() {
        let req = CreateDrRequest::new(
            "u-src".to_string(),
            "u-tgt".to_string(),
            vec!["ns-1".to_string()],
            "s-1".to_string(),
            8,
            false,
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["sourceUniverseUUID"], "u-src");
        assert_eq!(json["targetUniverseUUID"], "u-tgt");
        assert_eq!(
            json["bootstrapParams"]["backupRequestParams"]["storageConfigUUID"],
            "s-1"
        );
        assert_eq!(json["name"], "DR-config-u-src-to-u-tgt");
        assert_eq!(json["dryRun"], false);
    }

    #[test]
    fn failover_request_serializes_safetime_map() {
        let req = FailoverRequest {
            primary_universe_uuid: "u-p".to_string(),
            dr_replica_universe_uuid: "u-r".to_string(),
            namespace_id_safetime_epoch_us_map: BTreeMap::from([(
                "ns-1".to_string(),
                1_718_200_000_000_000_i64,
            )]),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["namespaceIdSafetimeEpochUsMap"]["ns-1"],
            1_718_200_000_000_000_i64
        );
    }
}
