use std::str::FromStr;

use time::OffsetDateTime;

use super::production_record::{ProductionRecord, Status};
use crate::error::StoreError;

/// Conjunctive record constraints. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub site_id: Option<String>,
    /// Inclusive lower bound.
    pub from: Option<OffsetDateTime>,
    /// Inclusive upper bound.
    pub to: Option<OffsetDateTime>,
    pub status: Option<Status>,
}

impl RecordFilter {
    pub fn for_site(site_id: impl Into<String>) -> Self {
        Self {
            site_id: Some(site_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &ProductionRecord) -> bool {
        self.site_id.as_deref().map_or(true, |id| record.site_id == id)
            && self.from.map_or(true, |from| record.timestamp >= from)
            && self.to.map_or(true, |to| record.timestamp <= to)
            && self.status.map_or(true, |status| record.status == status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Order of rows in the source file.
    #[default]
    File,
    /// Ascending by timestamp; ties keep file order.
    Timestamp,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SortOrder::File),
            "timestamp" => Ok(SortOrder::Timestamp),
            other => Err(StoreError::invalid_parameter(
                "sort",
                format!("unknown sort '{other}'; expected file or timestamp"),
            )),
        }
    }
}

/// Ordering and trivial slicing applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    pub sort: SortOrder,
    pub offset: usize,
    pub limit: Option<usize>,
}
