//! Constants for the fetch module (timeouts, staging, progress rendering).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Suffix appended to the final name while a transfer is in progress.
pub const STAGING_SUFFIX: &str = ".tmp";

/// Minimum interval between plain-text progress redraws.
pub(crate) const PLAIN_REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Width cleared before each plain-text progress redraw.
pub(crate) const PROGRESS_LINE_WIDTH: usize = 50;
