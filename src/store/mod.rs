// File-backed state shared by the request handlers.
// One JSON document per file, replaced atomically on every write.

pub mod clock;
pub mod counter;
pub mod json;
pub mod rate_limit;

use std::path::PathBuf;

use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock, bucket_for};
pub use counter::{ClickCounter, CounterState};
pub use json::JsonStore;
pub use rate_limit::{Decision, HourlyRateLimiter, RateLimitState};

/// Failure to persist state. Reads never fail; see [`JsonStore::load`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
