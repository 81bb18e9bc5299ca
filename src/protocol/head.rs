//! Response head prepared by `acknowledge`

use super::constants::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, STATUS_OK};

/// Status and framing headers of an event stream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP status code
    pub status: u16,
    /// Header name/value pairs, in emission order
    pub headers: Vec<(&'static str, &'static str)>,
}

impl ResponseHead {
    /// The head every accepted subscription receives
    pub fn event_stream() -> Self {
        Self {
            status: STATUS_OK,
            headers: vec![
                ("Content-Type", CONTENT_TYPE),
                ("Cache-Control", CACHE_CONTROL),
                ("Connection", CONNECTION),
            ],
        }
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Render as an HTTP/1.1 status line plus headers, terminated by an empty line
    pub fn to_http1(&self) -> String {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out
    }
}

impl Default for ResponseHead {
    fn default() -> Self {
        Self::event_stream()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        _ => "",
    }
}
