//! Monotonic catalogue version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the shared catalogue, in milliseconds since the Unix epoch.
///
/// Every mutation that changes the federated tool set moves the version
/// forward. Zero means the catalogue has never been loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogueVersion(i64);

impl CatalogueVersion {
    /// The version of an empty, never-loaded catalogue.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw version value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw version value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns the version that follows `self` when bumped at `now`.
    ///
    /// The result is the current time in milliseconds, or `self + 1` when
    /// the clock has not moved past the current version.
    #[must_use]
    pub fn next_after(self, now: DateTime<Utc>) -> Self {
        let successor = self.0.saturating_add(1);
        let millis = now.timestamp_millis();
        if millis > successor {
            Self(millis)
        } else {
            Self(successor)
        }
    }
}

impl fmt::Display for CatalogueVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
