//! Canonical event stream encoding
//!
//! Fields are emitted in the order `event`, `data`, `retry`, `id`, one
//! `"<field>: <value>\n"` line each. `data` is split on `\n` and every
//! fragment gets its own line, empty fragments included so blank lines
//! survive. A single empty line terminates the record.

use bytes::{BufMut, Bytes, BytesMut};

/// Remove embedded line feeds from a single-line field
pub(crate) fn strip_newlines(value: &str) -> String {
    value.replace('\n', "")
}

/// Serialize the four record fields
///
/// `event` and `id` must already be free of line feeds.
pub(crate) fn encode_fields(
    event: Option<&str>,
    data: Option<&str>,
    retry: Option<u64>,
    id: Option<&str>,
) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(event, data, id));

    if let Some(event) = event {
        put_line(&mut buf, "event", event);
    }

    if let Some(data) = data {
        for fragment in data.split('\n') {
            put_line(&mut buf, "data", fragment);
        }
    }

    if let Some(retry) = retry {
        put_line(&mut buf, "retry", &retry.to_string());
    }

    if let Some(id) = id {
        put_line(&mut buf, "id", id);
    }

    // An empty line dispatches the event
    buf.put_u8(b'\n');
    buf.freeze()
}

fn put_line(buf: &mut BytesMut, field: &str, value: &str) {
    buf.put_slice(field.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_u8(b'\n');
}

fn encoded_len_hint(event: Option<&str>, data: Option<&str>, id: Option<&str>) -> usize {
    let event = event.map_or(0, |e| e.len() + 8);
    let data = data.map_or(0, |d| d.len() + 7 * (d.matches('\n').count() + 1));
    let id = id.map_or(0, |i| i.len() + 5);
    event + data + id + 24
}
