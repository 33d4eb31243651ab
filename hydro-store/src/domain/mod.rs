pub mod aggregation;
pub mod filter;
pub mod production_record;
pub mod timestamp;

pub use aggregation::{AggregationResult, GroupBy, Metric, SeriesPoint, Step};
pub use filter::{ListOptions, RecordFilter, SortOrder};
pub use production_record::{Loss, ProductionRecord, Status};
pub use timestamp::{format_timestamp, parse_timestamp, TimeBucket, TimestampError};
