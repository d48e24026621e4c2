pub mod pve;

use crate::error::ApiError;
use crate::model::{Credentials, Node, StorageStatus, StorageVolume, VersionInfo, VirtualMachine};

/// Unauthenticated surface of a management endpoint.
#[allow(async_fn_in_trait)] // trait is internal-only
pub trait Endpoint {
    type Session: Session;

    /// Open (and immediately drop) a raw TCP connection to the management port.
    async fn probe(&self) -> Result<(), ApiError>;

    async fn version(&self) -> Result<VersionInfo, ApiError>;

    async fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session, ApiError>;
}

/// Authenticated handle returned by [`Endpoint::authenticate`].
#[allow(async_fn_in_trait)] // trait is internal-only
pub trait Session {
    async fn version(&self) -> Result<VersionInfo, ApiError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, ApiError>;

    async fn list_vms(&self, node: &str) -> Result<Vec<VirtualMachine>, ApiError>;

    async fn list_storage(&self, node: &str) -> Result<Vec<StorageVolume>, ApiError>;

    async fn storage_status(&self, node: &str, storage: &str) -> Result<StorageStatus, ApiError>;
}
