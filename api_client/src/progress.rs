//! Incremental decoder for the feature-generation event stream.
//!
//! The backend responds with a chunked body of newline-delimited lines, each
//! complete event prefixed with `data: ` followed by a JSON payload. Chunk
//! boundaries fall anywhere, so the decoder buffers bytes and only parses
//! once a full line is available.

use serde::Deserialize;

/// A decoded event from the generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Progress { current: u64, total: u64 },
    Complete { count: u64 },
    Failed(String),
}

/// Buffers raw stream chunks and yields complete events.
///
/// An incomplete trailing fragment is held back until more bytes arrive;
/// malformed lines are logged and skipped without aborting the stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    current: Option<u64>,
    total: Option<u64>,
    #[serde(default)]
    complete: bool,
    count: Option<u64>,
    error: Option<String>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<GenerationEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(idx) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=idx).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim()) {
                events.push(event);
            }
        }
        events
    }
}

fn parse_line(line: &str) -> Option<GenerationEvent> {
    let payload = line.strip_prefix("data: ")?;

    match serde_json::from_str::<RawEvent>(payload) {
        Ok(raw) => {
            if let Some(message) = raw.error {
                Some(GenerationEvent::Failed(message))
            } else if raw.complete {
                Some(GenerationEvent::Complete {
                    count: raw.count.unwrap_or(0),
                })
            } else if let (Some(current), Some(total)) = (raw.current, raw.total) {
                Some(GenerationEvent::Progress { current, total })
            } else {
                tracing::warn!("unrecognized stream payload: {}", payload);
                None
            }
        }
        Err(e) => {
            tracing::warn!("skipping malformed stream line: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_then_complete() {
        let mut decoder = LineDecoder::new();
        let events = decoder.feed(
            b"data: {\"progress\": 33, \"current\": 1, \"total\": 3}\n\n\
              data: {\"current\": 2, \"total\": 3}\n\n\
              data: {\"complete\": true, \"count\": 3}\n\n",
        );
        assert_eq!(
            events,
            vec![
                GenerationEvent::Progress { current: 1, total: 3 },
                GenerationEvent::Progress { current: 2, total: 3 },
                GenerationEvent::Complete { count: 3 },
            ]
        );
    }

    #[test]
    fn test_chunk_split_mid_line_reassembles_one_event() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"data: {\"cur").is_empty());
        let events = decoder.feed(b"rent\": 1, \"total\": 2}\n");
        assert_eq!(events, vec![GenerationEvent::Progress { current: 1, total: 2 }]);
    }

    #[test]
    fn test_malformed_line_skipped_stream_continues() {
        let mut decoder = LineDecoder::new();
        let events = decoder.feed(
            b"data: {not json}\n\
              data: {\"current\": 1, \"total\": 1}\n",
        );
        assert_eq!(events, vec![GenerationEvent::Progress { current: 1, total: 1 }]);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut decoder = LineDecoder::new();
        let events = decoder.feed(b"\nretry: 500\ndata: {\"complete\": true, \"count\": 0}\n");
        assert_eq!(events, vec![GenerationEvent::Complete { count: 0 }]);
    }

    #[test]
    fn test_error_event() {
        let mut decoder = LineDecoder::new();
        let events = decoder.feed(b"data: {\"error\": \"no images\"}\n");
        assert_eq!(events, vec![GenerationEvent::Failed("no images".into())]);
    }

    #[test]
    fn test_trailing_fragment_without_newline_held_back() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"data: {\"complete\": true, \"count\": 5}").is_empty());
        let events = decoder.feed(b"\n");
        assert_eq!(events, vec![GenerationEvent::Complete { count: 5 }]);
    }
}
