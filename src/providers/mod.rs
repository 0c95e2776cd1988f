//! # Update-Time Providers
//!
//! An update-time provider reports when a unit last changed at the source. Providers are
//! resolved by key from an [`UpdateProviderRegistry`] once, before a run starts.
//!
//! ## Built-in Providers
//!
//! - **filesystem**: modification time of the unit's storage location
//! - **metastore**: the `transient_lastDdlTime` parameter recorded with the unit

pub mod filesystem;
pub mod metastore;
pub mod registry;

use crate::error::DiscoveryResult;
use crate::models::UnitDescriptor;
use async_trait::async_trait;

pub use filesystem::FilesystemUpdateTimeProvider;
pub use metastore::MetastoreUpdateTimeProvider;
pub use registry::{UpdateProviderConstructor, UpdateProviderRegistry};

#[async_trait]
pub trait UpdateTimeProvider: Send + Sync {
    /// Last modification of `unit`, in milliseconds since epoch
    async fn get_update_time(&self, unit: &UnitDescriptor) -> DiscoveryResult<i64>;

    /// Name used in logs and diagnostics
    fn name(&self) -> &str;
}
