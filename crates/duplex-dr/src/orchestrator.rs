//! The DR orchestrator: submit-then-wait sequencing of every operation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use duplex_client::{
    BootstrapRequest, CreateDrRequest, FailoverRequest, PlatformApi, ReplicationState,
    SetTablesRequest, SwitchoverRequest, TableFilter,
};
use duplex_model::{
    ActionAccepted, DrConfig, DrConfigId, DrConfigState, TableId, TableInfo, TableType, Universe,
};
use duplex_reconcile as reconcile;
use duplex_task::{PollOptions, wait_for_task};

use crate::error::DrError;
use crate::storage::{StorageConfigChoice, select_storage_config};

/// Default bootstrap backup/restore parallelism.
pub const DEFAULT_PARALLELISM: u32 = 8;

/// Parameters for creating a DR relationship.
#[derive(Debug, Clone)]
pub struct CreateDrParams {
    /// Friendly name of the universe that will be the primary.
    pub source_universe: String,
    /// Friendly name of the universe that will be the replica.
    pub target_universe: String,
    /// Database names to include in replication.
    pub db_names: BTreeSet<String>,
    pub storage_config: StorageConfigChoice,
    pub parallelism: u32,
    pub dry_run: bool,
}

impl CreateDrParams {
    pub fn new(
        source_universe: impl Into<String>,
        target_universe: impl Into<String>,
        db_names: BTreeSet<String>,
    ) -> Self {
        Self {
            source_universe: source_universe.into(),
            target_universe: target_universe.into(),
            db_names,
            storage_config: StorageConfigChoice::Sole,
            parallelism: DEFAULT_PARALLELISM,
            dry_run: false,
        }
    }
}

/// Sequences DR operations against the control plane.
///
/// Stateless apart from the client and polling options; see the crate
/// docs for the serialization requirements on callers.
pub struct DrOrchestrator<C> {
    client: C,
    poll: PollOptions,
}

impl<C: PlatformApi> DrOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            poll: PollOptions::default(),
        }
    }

    /// Override polling behavior for the task waits.
    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// The underlying client, for queries outside the orchestrated flows.
    pub fn client(&self) -> &C {
        &self.client
    }

    // ── Lookups ───────────────────────────────────────────────────

    /// Resolve a universe by friendly name.
    async fn universe_by_name(&self, name: &str) -> Result<Universe, DrError> {
        let universes = self.client.universes_by_name(name).await?;
        universes
            .into_iter()
            .find(|u| u.name == name)
            .ok_or_else(|| DrError::UniverseNotFound(name.to_string()))
    }

    /// The DR config in which the named universe is the primary.
    async fn source_dr_config(&self, source_universe: &str) -> Result<DrConfig, DrError> {
        let universe = self.universe_by_name(source_universe).await?;
        let dr_id = universe
            .dr_config_uuids_as_source
            .first()
            .ok_or_else(|| DrError::DrConfigNotFound(source_universe.to_string()))?;
        Ok(self.client.dr_config(dr_id).await?)
    }

    async fn wait(&self, accepted: &ActionAccepted, name: &str) -> Result<String, DrError> {
        Ok(wait_for_task(&self.client, accepted, name, &self.poll).await?)
    }

    // ── Lifecycle ─────────────────────────────────────────────────

    /// Create a DR relationship between two universes.
    ///
    /// Returns the id of the new DR config.
    pub async fn create(&self, params: &CreateDrParams) -> Result<DrConfigId, DrError> {
        let storage_configs = self.client.storage_configs().await?;
        let storage_config_uuid = select_storage_config(&storage_configs, &params.storage_config)?;

        let source = self.universe_by_name(&params.source_universe).await?;
        if let Some(existing) = source.dr_config_uuids_as_source.first() {
            return Err(DrError::Conflict(format!(
                "universe '{}' already has DR config {existing}",
                params.source_universe
            )));
        }
        let target = self.universe_by_name(&params.target_universe).await?;

        let namespaces = self
            .client
            .list_namespaces(&source.universe_uuid, TableType::Pgsql)
            .await?;
        let mut dbs = Vec::new();
        let mut missing = Vec::new();
        for name in &params.db_names {
            match namespaces.iter().find(|ns| &ns.name == name) {
                Some(ns) => dbs.push(ns.namespace_uuid.clone()),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(DrError::NamespaceNotFound {
                universe: params.source_universe.clone(),
                names: missing.join(", "),
            });
        }

        let request = CreateDrRequest::new(
            source.universe_uuid,
            target.universe_uuid,
            dbs,
            storage_config_uuid,
            params.parallelism,
            params.dry_run,
        );
        let accepted = self.client.create_dr_config(&request).await?;
        let dr_id = self.wait(&accepted, "Create DR config").await?;
        info!(dr_config = %dr_id, source = %params.source_universe, "created DR config");
        Ok(dr_id)
    }

    /// Delete the DR config of the named source universe.
    pub async fn delete(&self, source_universe: &str, force: bool) -> Result<String, DrError> {
        let universe = self.universe_by_name(source_universe).await?;
        let dr_id = universe
            .dr_config_uuids_as_source
            .first()
            .ok_or_else(|| DrError::DrConfigNotFound(source_universe.to_string()))?;

        let accepted = self.client.delete_dr_config(dr_id, force).await?;
        let resource = self.wait(&accepted, "Delete DR config").await?;
        info!(dr_config = %resource, "deleted DR config");
        Ok(resource)
    }

    // ── Table membership ──────────────────────────────────────────

    /// Tables of the source universe not yet included in replication.
    ///
    /// Tables with a non-zero size will trigger a full bootstrap copy
    /// when added; surfacing size here lets operators plan around that.
    pub async fn available_tables(
        &self,
        source_universe: &str,
    ) -> Result<Vec<TableInfo>, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        let all = self
            .client
            .list_tables(&dr.primary_universe_uuid, &TableFilter::default())
            .await?;
        Ok(reconcile::available_tables(&all, &dr.tables))
    }

    /// Add tables to replication.
    ///
    /// The submitted payload is always the complete desired membership:
    /// current tables plus the validated additions. Candidates must
    /// already exist on the replica (matched by keyspace/schema/name),
    /// since replication cannot create tables on the target side.
    pub async fn add_tables(
        &self,
        source_universe: &str,
        requested: &BTreeSet<TableId>,
    ) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;

        let all = self
            .client
            .list_tables(&dr.primary_universe_uuid, &TableFilter::default())
            .await?;
        let candidates = reconcile::available_tables(&all, &dr.tables);
        let to_add = reconcile::filter_requested(&candidates, requested)?;

        let replica_tables = self
            .client
            .list_tables(&dr.dr_replica_universe_uuid, &TableFilter::default())
            .await?;
        reconcile::validate_on_replica(&to_add, &replica_tables)?;

        let desired = reconcile::add_set(&dr.tables, &to_add);
        info!(
            dr_config = %dr.uuid,
            adding = to_add.len(),
            total = desired.len(),
            "replacing DR table membership"
        );
        let accepted = self
            .client
            .set_dr_tables(&dr.uuid, &self.set_tables_request(&dr, desired))
            .await?;
        Ok(self.wait(&accepted, "Add tables to DR").await?)
    }

    /// Remove tables from replication.
    ///
    /// Submits current membership minus the requested ids, again as the
    /// complete set. Run this before dropping a table; drop on the
    /// replica first, then on the primary.
    pub async fn remove_tables(
        &self,
        source_universe: &str,
        requested: &BTreeSet<TableId>,
    ) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        let remaining = reconcile::remove_set(&dr.tables, requested)?;

        info!(
            dr_config = %dr.uuid,
            removing = dr.tables.len() - remaining.len(),
            total = remaining.len(),
            "replacing DR table membership"
        );
        let accepted = self
            .client
            .set_dr_tables(&dr.uuid, &self.set_tables_request(&dr, remaining))
            .await?;
        Ok(self.wait(&accepted, "Remove tables from DR").await?)
    }

    fn set_tables_request(&self, dr: &DrConfig, tables: Vec<TableId>) -> SetTablesRequest {
        SetTablesRequest {
            auto_include_index_tables: true,
            bootstrap_params: BootstrapRequest::new(
                dr.storage_config_uuid().clone(),
                dr.bootstrap_params.backup_request_params.parallelism,
            ),
            tables,
        }
    }

    // ── Role changes ──────────────────────────────────────────────

    /// Planned role exchange with zero data loss.
    pub async fn switchover(&self, source_universe: &str) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        let request = SwitchoverRequest {
            primary_universe_uuid: dr.primary_universe_uuid.clone(),
            dr_replica_universe_uuid: dr.dr_replica_universe_uuid.clone(),
        };
        let accepted = self.client.switchover(&dr.uuid, &request).await?;
        let resource = self.wait(&accepted, "Switchover DR").await?;
        info!(dr_config = %dr.uuid, "switchover complete");
        Ok(resource)
    }

    /// Unplanned promotion of the replica after primary failure.
    ///
    /// Safe times are fetched immediately before submission, not earlier
    /// in the flow, to keep the reported data-loss window as tight as
    /// possible. After success the former replica runs as a primary with
    /// no DR config; follow up with [`repair`](Self::repair).
    pub async fn failover(&self, source_universe: &str) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;

        let safe_times = self.client.dr_safe_times(&dr.uuid).await?;
        let safetime_map: BTreeMap<_, _> = safe_times
            .safetimes
            .into_iter()
            .map(|entry| (entry.namespace_id, entry.safetime_epoch_us))
            .collect();

        let request = FailoverRequest {
            primary_universe_uuid: dr.primary_universe_uuid.clone(),
            dr_replica_universe_uuid: dr.dr_replica_universe_uuid.clone(),
            namespace_id_safetime_epoch_us_map: safetime_map,
        };
        let accepted = self.client.failover(&dr.uuid, &request).await?;
        let resource = self.wait(&accepted, "Failover DR").await?;
        info!(dr_config = %dr.uuid, "failover complete");
        Ok(resource)
    }

    /// Post-failover restart, bootstrapping the failed former primary as
    /// the new replica.
    ///
    /// The full bootstrap copies the current primary's data back, so
    /// duration scales with database size. The config must actually be in
    /// the post-failover `Halted` state; restarting a healthy
    /// relationship would needlessly re-bootstrap it.
    pub async fn repair(&self, source_universe: &str) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        if dr.state != DrConfigState::Halted {
            let state: String = dr.state.clone().into();
            return Err(DrError::Conflict(format!(
                "DR config {} is in state '{state}', expected 'Halted'; repair only applies after a failover",
                dr.uuid
            )));
        }

        let accepted = self.client.restart_dr_config(&dr.uuid, &[], false).await?;
        let resource = self.wait(&accepted, "Repair DR").await?;
        info!(dr_config = %dr.uuid, "repair complete");
        Ok(resource)
    }

    /// Reconcile DR-tracked state with changes made directly against the
    /// database (typically index DDL).
    pub async fn sync(&self, source_universe: &str) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        let accepted = self.client.sync_dr_config(&dr.uuid).await?;
        Ok(self.wait(&accepted, "Sync DR").await?)
    }

    // ── Replication stream ────────────────────────────────────────

    /// Pause the underlying replication stream.
    pub async fn pause(&self, source_universe: &str) -> Result<String, DrError> {
        self.edit_replication(source_universe, ReplicationState::Paused, "Pause replication")
            .await
    }

    /// Resume a paused replication stream.
    pub async fn resume(&self, source_universe: &str) -> Result<String, DrError> {
        self.edit_replication(source_universe, ReplicationState::Running, "Resume replication")
            .await
    }

    async fn edit_replication(
        &self,
        source_universe: &str,
        state: ReplicationState,
        friendly_name: &str,
    ) -> Result<String, DrError> {
        let dr = self.source_dr_config(source_universe).await?;
        let xcluster = dr.xcluster_config_uuid.as_ref().ok_or_else(|| {
            DrError::Conflict(format!(
                "DR config {} has no underlying replication stream to edit",
                dr.uuid
            ))
        })?;
        let accepted = self
            .client
            .set_replication_state(xcluster, state)
            .await?;
        Ok(self.wait(&accepted, friendly_name).await?)
    }
}
