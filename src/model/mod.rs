pub mod aggregate;
pub mod period;
pub mod record;

pub use aggregate::{AggregateTable, PlayerAggregate, PlayerTotals, AGGREGATE_COLUMNS};
pub use period::{CacheKey, Period, Span};
pub use record::{RawRecord, MIN_RAW_FIELDS, RAW_COLUMNS};
