pub mod signature;
pub mod snapshot;
pub mod unit;

pub use signature::Signature;
pub use snapshot::{Aggregator, FreeList, Snapshot, StatusCounts};
pub use unit::{normalize_ws, UnitRecord, UnitStatus};
