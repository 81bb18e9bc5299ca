//! Server-Sent Events protocol constants

use std::time::Duration;

/// HTTP status sent when a subscription is accepted
pub const STATUS_OK: u16 = 200;

/// Content type of an event stream response
pub const CONTENT_TYPE: &str = "text/event-stream;charset=utf-8";

/// Cache-Control header value
pub const CACHE_CONTROL: &str = "no-cache";

/// Connection header value
pub const CONNECTION: &str = "keep-alive";

/// Sentinel frame written once the stream is open
pub const OPEN_FRAME: &[u8] = b"event: open\n\n";

/// Default number of records kept for replay
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Default interval between keepalive pings
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Event name of keepalive pings
pub const PING_EVENT: &str = "ping";
