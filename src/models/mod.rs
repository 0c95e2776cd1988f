//! Units, watermarks and the work units built from them.

pub mod unit;
pub mod watermark;
pub mod work_unit;

pub use unit::{FieldSchema, UnitDescriptor, UnitShape};
pub use watermark::{Watermark, WatermarkInterval};
pub use work_unit::UnitOfWork;
