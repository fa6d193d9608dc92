//! duplex-client: typed client for the database control-plane API.
//!
//! The client is constructed once from an explicit [`ClientConfig`] and
//! passed by reference; there is no global base URL or header state. The
//! session's customer id is resolved a single time at [`HttpClient::connect`]
//! and injected into every request path.
//!
//! The core crates never name [`HttpClient`] directly: the task monitor is
//! generic over [`TaskApi`] and the orchestrator over [`PlatformApi`], so
//! both run against in-memory fakes in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::{PlatformApi, TableFilter, TaskApi};
pub use api::{
    BackupRequest, BootstrapRequest, CreateDrRequest, FailoverRequest, ReplicationState,
    SetTablesRequest, SwitchoverRequest,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
