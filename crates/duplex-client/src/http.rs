//! reqwest-backed implementation of the platform API.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use duplex_model::{
    ActionAccepted, CustomerConfig, CustomerId, DrConfig, DrConfigId, NamespaceId, NamespaceInfo,
    SafeTimes, SessionInfo, TableInfo, TableType, TaskFailureDetail, TaskId, TaskStatus, Universe,
    UniverseId, XClusterConfigId,
};

use crate::api::{
    CreateDrRequest, FailoverRequest, PlatformApi, ReplicationState, SetTablesRequest,
    SwitchoverRequest, TableFilter, TaskApi,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Header carrying the API token on every request.
const AUTH_HEADER: &str = "X-AUTH-YW-API-TOKEN";

/// HTTP client for the control plane, bound to one customer session.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    customer: CustomerId,
}

impl HttpClient {
    /// Build the client and resolve the session's customer id.
    ///
    /// The customer id scopes every other endpoint path, so connecting
    /// eagerly turns a bad URL or token into an error at startup instead
    /// of on the first operation.
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let token = config
            .token()
            .ok_or_else(|| ClientError::InvalidConfig("missing api token".to_string()))?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        let mut client = Self {
            http,
            base_url: config.trimmed_base_url().to_string(),
            api_token: token,
            customer: CustomerId::new(),
        };

        let session: SessionInfo = client
            .get_json(format!("{}/api/v1/session_info", client.base_url))
            .await?;
        debug!(customer = %session.customer_uuid, "control-plane session established");
        client.customer = session.customer_uuid;
        Ok(client)
    }

    /// Customer id this client is scoped to.
    pub fn customer_uuid(&self) -> &CustomerId {
        &self.customer
    }

    /// Customer-scoped endpoint URL.
    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/customers/{}{suffix}",
            self.base_url, self.customer
        )
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                body,
            });
        }
        response.json::<T>().await.map_err(|e| ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: String) -> ClientResult<T> {
        debug!(%endpoint, "GET");
        let response = self
            .http
            .get(&endpoint)
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: String,
        body: Option<&B>,
    ) -> ClientResult<T> {
        debug!(%endpoint, "POST");
        let mut request = self
            .http
            .post(&endpoint)
            .header(AUTH_HEADER, &self.api_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::decode(&endpoint, response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: String,
        body: &B,
    ) -> ClientResult<T> {
        debug!(%endpoint, "PUT");
        let response = self
            .http
            .put(&endpoint)
            .header(AUTH_HEADER, &self.api_token)
            .json(body)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, endpoint: String) -> ClientResult<T> {
        debug!(%endpoint, "DELETE");
        let response = self
            .http
            .delete(&endpoint)
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }
}

#[async_trait]
impl TaskApi for HttpClient {
    async fn task_status(&self, task: &TaskId) -> ClientResult<TaskStatus> {
        self.get_json(self.url(&format!("/tasks/{task}"))).await
    }

    async fn task_failure(&self, task: &TaskId) -> ClientResult<TaskFailureDetail> {
        self.get_json(self.url(&format!("/tasks/{task}/failed")))
            .await
    }
}

#[async_trait]
impl PlatformApi for HttpClient {
    async fn universes_by_name(&self, name: &str) -> ClientResult<Vec<Universe>> {
        self.get_json(self.url(&format!("/universes?name={name}")))
            .await
    }

    async fn dr_config(&self, id: &DrConfigId) -> ClientResult<DrConfig> {
        self.get_json(self.url(&format!("/dr_configs/{id}"))).await
    }

    async fn storage_configs(&self) -> ClientResult<Vec<CustomerConfig>> {
        let configs: Vec<CustomerConfig> = self.get_json(self.url("/configs")).await?;
        Ok(configs
            .into_iter()
            .filter(|c| c.config_type == "STORAGE")
            .collect())
    }

    async fn list_tables(
        &self,
        universe: &UniverseId,
        filter: &TableFilter,
    ) -> ClientResult<Vec<TableInfo>> {
        let endpoint = self.url(&format!(
            "/universes/{universe}/tables?includeParentTableInfo=false&onlySupportedForXCluster={}",
            filter.only_supported
        ));
        let tables: Vec<TableInfo> = self.get_json(endpoint).await?;
        // Type and keyspace narrowing happen here; the endpoint only
        // understands the replication-support flag.
        Ok(tables.into_iter().filter(|t| filter.matches(t)).collect())
    }

    async fn list_namespaces(
        &self,
        universe: &UniverseId,
        table_type: TableType,
    ) -> ClientResult<Vec<NamespaceInfo>> {
        let namespaces: Vec<NamespaceInfo> = self
            .get_json(self.url(&format!("/universes/{universe}/namespaces")))
            .await?;
        Ok(namespaces
            .into_iter()
            .filter(|ns| ns.table_type == table_type)
            .collect())
    }

    async fn dr_safe_times(&self, dr: &DrConfigId) -> ClientResult<SafeTimes> {
        self.get_json(self.url(&format!("/dr_configs/{dr}/safetime")))
            .await
    }

    async fn create_dr_config(&self, req: &CreateDrRequest) -> ClientResult<ActionAccepted> {
        self.post_json(self.url("/dr_configs"), Some(req)).await
    }

    async fn delete_dr_config(
        &self,
        dr: &DrConfigId,
        force: bool,
    ) -> ClientResult<ActionAccepted> {
        self.delete_json(self.url(&format!("/dr_configs/{dr}?isForceDelete={force}")))
            .await
    }

    async fn set_dr_tables(
        &self,
        dr: &DrConfigId,
        req: &SetTablesRequest,
    ) -> ClientResult<ActionAccepted> {
        self.post_json(self.url(&format!("/dr_configs/{dr}/set_tables")), Some(req))
            .await
    }

    async fn switchover(
        &self,
        dr: &DrConfigId,
        req: &SwitchoverRequest,
    ) -> ClientResult<ActionAccepted> {
        self.post_json(self.url(&format!("/dr_configs/{dr}/switchover")), Some(req))
            .await
    }

    async fn failover(
        &self,
        dr: &DrConfigId,
        req: &FailoverRequest,
    ) -> ClientResult<ActionAccepted> {
        self.post_json(self.url(&format!("/dr_configs/{dr}/failover")), Some(req))
            .await
    }

    async fn restart_dr_config(
        &self,
        dr: &DrConfigId,
        dbs: &[NamespaceId],
        force: bool,
    ) -> ClientResult<ActionAccepted> {
        let body = serde_json::json!({ "dbs": dbs });
        self.post_json(
            self.url(&format!("/dr_configs/{dr}/restart?isForceDelete={force}")),
            Some(&body),
        )
        .await
    }

    async fn sync_dr_config(&self, dr: &DrConfigId) -> ClientResult<ActionAccepted> {
        self.post_json::<_, ()>(self.url(&format!("/dr_configs/{dr}/sync")), None)
            .await
    }

    async fn set_replication_state(
        &self,
        xcluster: &XClusterConfigId,
        state: ReplicationState,
    ) -> ClientResult<ActionAccepted> {
        let body = serde_json::json!({ "status": state.as_str() });
        self.put_json(self.url(&format!("/xcluster_configs/{xcluster}")), &body)
            .await
    }
}
