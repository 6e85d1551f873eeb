//! Clock port interface

use chrono::{DateTime, Utc};

/// Source of the current instant, used to stamp artifact names
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}
