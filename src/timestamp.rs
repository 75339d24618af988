//! HTTP timestamps and the injectable clock.
//!
//! HTTP dates carry whole seconds only. A `Last-Modified` value read from a
//! filesystem or a database usually does not, so every comparison made by the
//! evaluator goes through [`Timestamp::truncated`] first.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Error;

/// Seconds from the epoch to 10000-01-01T00:00:00Z.
const MAX_HTTP_DATE_SECS: u64 = 253_402_300_800;

/// An absolute point in time.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(SystemTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(SystemTime::now())
    }

    pub fn from_unix_secs(secs: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Parses an `HTTP-date` (IMF-fixdate, RFC 850 or asctime format).
    pub fn parse_http_date(s: &str) -> Result<Self, Error> {
        httpdate::parse_http_date(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.to_owned()))
    }

    /// IMF-fixdate rendering, or `None` outside the years HTTP can express.
    pub fn to_http_date(self) -> Option<String> {
        let secs = self.0.duration_since(UNIX_EPOCH).ok()?.as_secs();
        (secs < MAX_HTTP_DATE_SECS).then(|| httpdate::fmt_http_date(self.0))
    }

    /// Drops the sub-second part, rounding towards the past.
    pub fn truncated(self) -> Self {
        let floored = match self.0.duration_since(UNIX_EPOCH) {
            Ok(since) => UNIX_EPOCH.checked_add(Duration::from_secs(since.as_secs())),
            Err(e) => {
                let before = e.duration();
                let secs = before.as_secs() + u64::from(before.subsec_nanos() > 0);
                UNIX_EPOCH.checked_sub(Duration::from_secs(secs))
            }
        };
        floored.map_or(self, Self)
    }

    pub fn as_system_time(self) -> SystemTime {
        self.0
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        Self(t)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_http_date() {
            Some(date) => f.write_str(&date),
            None => write!(f, "{:?}", self.0),
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of "now" for the future-date checks in the evaluator.
///
/// Pass [`SystemClock`] in production and a fixed [`Timestamp`] in tests.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A timestamp used as a clock is frozen at that instant.
impl Clock for Timestamp {
    fn now(&self) -> Timestamp {
        *self
    }
}
