use std::{fmt, str::FromStr};

use serde::Serialize;
use time::OffsetDateTime;

use crate::error::StoreError;

/// Operational status of a site at measurement time.
///
/// Variants are declared from least to most severe; `Ord` follows that order
/// so the most severe status of a group is simply its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Maintenance,
    Offline,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Maintenance, Status::Offline];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Maintenance => "maintenance",
            Status::Offline => "offline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                StoreError::invalid_parameter(
                    "status",
                    format!("unknown status '{}'; expected one of active, maintenance, offline", s.trim()),
                )
            })
    }
}

/// One loss term reported alongside the production value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Loss {
    pub value: f64,
    /// Quality flag of the value; larger is worse (1 valid, 2 invalid in the usual feeds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<u8>,
}

impl Loss {
    /// Add `other` into `self`: values sum, the worst validity wins.
    pub fn accumulate(&mut self, other: &Loss) {
        self.value += other.value;
        self.validity = self.validity.max(other.validity);
    }
}

/// One measurement of hydroelectric output for a site.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRecord {
    pub site_id: String,
    pub site_name: Option<String>,
    /// Always UTC.
    pub timestamp: OffsetDateTime,
    pub output_value: f64,
    pub unit: String,
    pub status: Status,
    /// In configured loss-column order; empty when no loss columns are mapped.
    pub losses: Vec<Loss>,
}
