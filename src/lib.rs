#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Watermark Discovery
//!
//! Incremental discovery of changed datasets using per-unit watermarks.
//!
//! ## Overview
//!
//! A discovery run walks a catalog of tables, expands partitioned tables into their
//! partitions, and compares each unit's last update time against the high watermark the
//! previous run recorded for it. Every unit updated strictly after that watermark becomes a
//! [`UnitOfWork`] carrying the interval `(low, expected_high)` a downstream extractor should
//! process. Unchanged units produce nothing.
//!
//! ## Module Organization
//!
//! - [`catalog`] - Dataset enumeration and partition listing
//! - [`providers`] - Update time lookup (filesystem, metastore) and the provider registry
//! - [`watermark`] - Previous high watermark lookup
//! - [`discovery`] - Change detection, work-unit assembly and the run driver
//! - [`models`] - Unit descriptors, watermarks and work units
//! - [`config`] - YAML configuration with environment overrides
//! - [`events`] - Run events and the per-run report
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use watermark_discovery::catalog::InMemoryCatalog;
//! use watermark_discovery::config::ConfigManager;
//! use watermark_discovery::discovery::DiscoverySource;
//! use watermark_discovery::providers::UpdateProviderRegistry;
//! use watermark_discovery::watermark::store_from_config;
//!
//! # async fn example(catalog: InMemoryCatalog) -> Result<(), Box<dyn std::error::Error>> {
//! watermark_discovery::logging::init_structured_logging();
//!
//! let manager = ConfigManager::load()?;
//! let store = store_from_config(&manager.config().watermark, Vec::new())?;
//! let source = DiscoverySource::from_config(
//!     manager.config(),
//!     &UpdateProviderRegistry::with_defaults(),
//!     store,
//! )?;
//!
//! let run = source.get_work_units(&catalog).await?;
//! println!("run {} produced {} work units", run.run_id, run.work_units.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod providers;
pub mod serialization;
pub mod watermark;

pub use catalog::{Dataset, DatasetCatalog, InMemoryCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigManager, ConfigurationError, DiscoveryConfig};
pub use discovery::{ChangeDecision, ChangeDetector, DiscoveryRun, DiscoverySource, WorkUnitAssembler};
pub use error::{DiscoveryError, DiscoveryResult};
pub use events::{EventPublisher, RunContext, RunReport, SkipReason, SkippedUnit};
pub use models::{FieldSchema, UnitDescriptor, UnitOfWork, UnitShape, Watermark, WatermarkInterval};
pub use providers::{
    FilesystemUpdateTimeProvider, MetastoreUpdateTimeProvider, UpdateProviderRegistry,
    UpdateTimeProvider,
};
pub use serialization::{JsonUnitSerializer, UnitSerializer};
pub use watermark::{
    InMemoryWatermarkStore, PreviousWorkUnitState, TableLevelWatermarker, WatermarkStore,
};
