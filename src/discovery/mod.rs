//! # Incremental Discovery
//!
//! Change detection and work-unit assembly over a dataset catalog.
//!
//! ## Core Components
//!
//! - **ChangeDetector**: strict `update_time > low_watermark` decision for one unit
//! - **WorkUnitAssembler**: catalog walk, shape dispatch and work-unit construction
//! - **DiscoverySource**: resolves collaborators from configuration and reports run events
//!
//! ```text
//! DiscoverySource
//! └── WorkUnitAssembler ── DatasetCatalog
//!     ├── WatermarkStore
//!     └── ChangeDetector ── UpdateTimeProvider
//! ```

pub mod change_detector;
pub mod source;
pub mod work_unit_assembler;

pub use change_detector::{ChangeDecision, ChangeDetector};
pub use source::{DiscoveryRun, DiscoverySource};
pub use work_unit_assembler::WorkUnitAssembler;
