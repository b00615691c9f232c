use core::fmt::Display;
use core::ops::Add;
use core::time::Duration;

use chrono::{offset::Utc, DateTime, LocalResult, TimeZone};
use flex_error::define_error;
use serde_derive::{Deserialize, Serialize};

pub const ZERO_DURATION: Duration = Duration::from_secs(0);

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Block time of a chain, or the time at which a host processed a client
/// update. On the wire this is a `u64` of Unix nanoseconds where 0 means unset.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Default, Deserialize, Serialize, Hash)]
pub struct Timestamp {
    time: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn from_nanoseconds(nanoseconds: u64) -> Result<Timestamp, ParseTimestampError> {
        if nanoseconds == 0 {
            return Ok(Timestamp::none());
        }

        let secs = i64::try_from(nanoseconds / NANOS_PER_SEC).unwrap_or(i64::MAX);
        let nanos = u32::try_from(nanoseconds % NANOS_PER_SEC).unwrap_or(0);

        match Utc.timestamp_opt(secs, nanos) {
            LocalResult::Single(time) => Ok(Timestamp { time: Some(time) }),
            _ => Err(ParseTimestampError::invalid_timestamp_conversion(secs, nanos)),
        }
    }

    pub fn none() -> Self {
        Timestamp { time: None }
    }

    pub fn is_set(&self) -> bool {
        self.time.is_some()
    }

    /// Unix nanoseconds, 0 when unset or before the epoch.
    pub fn as_nanoseconds(&self) -> u64 {
        self.time
            .and_then(|time| {
                let secs = u64::try_from(time.timestamp()).ok()?;
                Some(
                    secs.saturating_mul(NANOS_PER_SEC)
                        .saturating_add(u64::from(time.timestamp_subsec_nanos())),
                )
            })
            .unwrap_or(0)
    }

    /// Strictly later than `other`. False if either side is unset.
    pub fn after(&self, other: &Timestamp) -> bool {
        match (self.time, other.time) {
            (Some(this), Some(other)) => this > other,
            _ => false,
        }
    }

    /// At `other` or later. False if either side is unset.
    pub fn reached(&self, other: &Timestamp) -> bool {
        match (self.time, other.time) {
            (Some(this), Some(other)) => this >= other,
            _ => false,
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.time {
            Some(time) => write!(f, "Timestamp({})", time.to_rfc3339()),
            None => write!(f, "Timestamp(NoTimestamp)"),
        }
    }
}

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    TimestampOverflowError {
        TimestampOverflow
            |_| { "timestamp overflow when adding a duration" }
    }
}

/// Adding to an unset timestamp leaves it unset.
impl Add<Duration> for Timestamp {
    type Output = Result<Timestamp, TimestampOverflowError>;

    fn add(self, duration: Duration) -> Result<Timestamp, TimestampOverflowError> {
        let Some(time) = self.time else {
            return Ok(self);
        };

        let duration = chrono::Duration::from_std(duration)
            .map_err(|_| TimestampOverflowError::timestamp_overflow())?;

        time.checked_add_signed(duration)
            .map(|time| Timestamp { time: Some(time) })
            .ok_or_else(TimestampOverflowError::timestamp_overflow)
    }
}

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    ParseTimestampError {
        InvalidTimestampConversion
            {
                secs: i64,
                nanos: u32,
            }
            |e| {
                format!("cannot convert {}s + {}ns into a timestamp", e.secs, e.nanos)
            },
    }
}
