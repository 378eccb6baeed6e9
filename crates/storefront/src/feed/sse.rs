//! Incremental server-sent-events parser.
//!
//! Bytes are buffered until a full line is available, so a UTF-8 sequence or
//! a field split across network chunks is reassembled before decoding.

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, `message` when the server sent none.
    pub event: String,
    /// Data lines joined with `\n`.
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the feed uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut parser = SseParser::new();
        let events = parser.push(b"event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n");

        assert_eq!(
            events,
            [SseEvent {
                event: "put".to_string(),
                data: r#"{"path":"/","data":null}"#.to_string(),
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: pa").is_empty());
        assert!(parser.push(b"tch\r\ndata: 1").is_empty());
        let events = parser.push(b"23\r\n\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "patch");
        assert_eq!(events[0].data, "123");
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let bytes = "data: حذاء\n\n".as_bytes();
        let mut parser = SseParser::new();
        assert!(parser.push(&bytes[..7]).is_empty());
        let events = parser.push(&bytes[7..]);

        assert_eq!(events[0].data, "حذاء");
    }

    #[test]
    fn test_multi_line_data_and_comments() {
        let mut parser = SseParser::new();
        let events = parser.push(b": heartbeat\ndata: a\ndata: b\nid: 7\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn test_several_events_in_one_chunk() {
        let mut parser = SseParser::new();
        let events = parser.push(b"event: keep-alive\ndata: null\n\nevent: cancel\ndata: null\n\n");

        let kinds: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(kinds, ["keep-alive", "cancel"]);
    }

    #[test]
    fn test_blank_line_without_data_dispatches_nothing() {
        let mut parser = SseParser::new();
        assert!(parser.push(b"event: put\n\n").is_empty());
        // The stale event type must not leak into the next event.
        let events = parser.push(b"data: x\n\n");
        assert_eq!(events[0].event, "message");
    }
}
