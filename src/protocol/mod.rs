//! Server-Sent Events protocol framing
//!
//! An event stream is a `200` response with a `text/event-stream` body. The
//! body opens with an `event: open` sentinel and then carries one text frame
//! per event record:
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: text/event-stream;charset=utf-8
//! Cache-Control: no-cache
//! Connection: keep-alive
//!
//! event: open
//!
//! event: message
//! data: hello
//! id: 1
//!
//! ```
//!
//! Reference: WHATWG HTML Living Standard, "Server-sent events"

pub mod constants;
pub mod head;

pub use head::ResponseHead;
