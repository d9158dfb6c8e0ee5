//! Constants for the fetch module (timeouts, accepted content, pacing).

use std::time::Duration;

/// Upper bound on the TCP/TLS connect phase; the overall request timeout still applies.
pub const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept header sent with every abstract page request.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Cumulative pacing after which the pacer logs a one-time notice.
pub const CUMULATIVE_PAUSE_NOTICE_THRESHOLD: Duration = Duration::from_secs(60);
