use serde::Deserialize;

use crate::render::StreamEvent;

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes one server-sent `data: {...}` line.
///
/// Lines that are not data lines, do not parse, or carry neither field are
/// skipped (`None`). An `error` field wins over `content`.
pub fn decode_sse_line(line: &str) -> Option<StreamEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let json = line.strip_prefix("data: ")?;
    let payload: Payload = match serde_json::from_str(json) {
        Ok(payload) => payload,
        Err(err) => {
            log::debug!("skipping undecodable stream line: {err}");
            return None;
        }
    };
    match payload {
        Payload {
            error: Some(message),
            ..
        } => Some(StreamEvent::Error(message)),
        Payload {
            content: Some(text),
            ..
        } if !text.is_empty() => Some(StreamEvent::Fragment(text)),
        _ => None,
    }
}

/// Splits a byte-chunked event stream into lines, holding back a line cut
/// off at a chunk boundary until the rest arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: String,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.pending.push_str(chunk);
        let mut events = Vec::new();
        while let Some(nl) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=nl).collect();
            events.extend(decode_sse_line(line.trim_end_matches('\n')));
        }
        events
    }

    /// Decodes whatever is left once the transport closes.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.pending);
        decode_sse_line(&rest)
    }
}
