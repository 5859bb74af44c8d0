//! Reservation windows and timestamp parsing

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{AllocError, AllocResult};

/// Formats accepted for timestamps without an offset, read as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A time window whose end lies strictly after its start
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AllocResult<Self> {
        if end <= start {
            return Err(AllocError::InvalidInput(
                "End time must be after start time.".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Build a window from the strings a browser sent
    pub fn parse(start: Option<&str>, end: Option<&str>) -> AllocResult<Self> {
        let start = parse_timestamp(start, "start time")?;
        let end = parse_timestamp(end, "end time")?;
        Self::new(start, end)
    }

    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether the window is over at `now`
    #[inline]
    pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.end <= now
    }
}

/// Parse an RFC 3339 timestamp or an offset-less `YYYY-MM-DDTHH:MM[:SS]`
pub fn parse_timestamp(raw: Option<&str>, what: &str) -> AllocResult<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        AllocError::InvalidInput(format!("The {what} is required."))
    })?;

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AllocError::InvalidInput(format!("The {what} `{raw}` is not a valid date.")))
}
