use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised timestamp '{0}'; expected RFC 3339, 'YYYY-MM-DD HH:MM[:SS[.fff]]' or 'YYYY-MM-DD'")]
pub struct TimestampError(pub String);

/// Parse a date or datetime and normalise it to UTC.
///
/// Accepted forms:
/// - RFC 3339 with any offset (`2025-02-01T06:00:00+01:00`), a space may stand in for `T`
/// - naive datetime (`2025-02-01 05:00:00`, `2025-02-01T05:00:00.5`, `2025-02-01T05:00`), taken as UTC
/// - bare date (`2025-02-01`), taken as midnight UTC
pub fn parse_timestamp(input: &str) -> Result<OffsetDateTime, TimestampError> {
    let trimmed = input.trim();
    let normalized = if trimmed.len() > 10 && trimmed.as_bytes()[10] == b' ' {
        format!("{}T{}", &trimmed[..10], &trimmed[11..])
    } else {
        trimmed.to_string()
    };

    if let Ok(ts) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }

    let naive = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    });
    if let Ok(naive) = naive {
        return Ok(naive.assume_utc());
    }

    if let Ok(date) = Date::parse(&normalized, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_utc());
    }

    Err(TimestampError(trimmed.to_string()))
}

/// Canonical wire format: `YYYY-MM-DDTHH:MM:SSZ`, second precision, UTC.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
    ))
    .unwrap_or_else(|_| utc.to_string())
}

/// Calendar bucket used for time grouping and resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Hour,
    Day,
    Month,
}

impl TimeBucket {
    /// Start of the bucket containing `ts`, in UTC.
    pub fn start_of(&self, ts: OffsetDateTime) -> OffsetDateTime {
        let utc = ts.to_offset(UtcOffset::UTC);
        let date = utc.date();
        let start = match self {
            TimeBucket::Hour => date.with_hms(utc.hour(), 0, 0).ok(),
            TimeBucket::Day => Some(date.midnight()),
            TimeBucket::Month => Date::from_calendar_date(date.year(), date.month(), 1)
                .ok()
                .map(Date::midnight),
        };
        start.map(PrimitiveDateTime::assume_utc).unwrap_or(utc)
    }
}
