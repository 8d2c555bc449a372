use serde::Deserialize;

const DONE_SENTINEL: &str = "[DONE]";

/// One decoded server-sent event of a streamed chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Delta(String),
    Done,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental decoder for `data:` lines of a chat-completion event stream.
///
/// Bytes are buffered until a full line is available, so chunk boundaries may
/// fall anywhere, including inside a line or a multi-byte character.
/// Nothing is emitted after `[DONE]`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        if self.done {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(frame) = self.decode_line(&line[..newline]) {
                frames.push(frame);
            }
            if self.done {
                self.pending.clear();
                break;
            }
        }
        frames
    }

    /// Decodes a trailing line that was not terminated by a newline.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        if self.done || self.pending.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.pending);
        self.decode_line(&line).into_iter().collect()
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let line = String::from_utf8_lossy(raw);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);

        if data == DONE_SENTINEL {
            self.done = true;
            return Some(SseFrame::Done);
        }

        match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty())
                .map(SseFrame::Delta),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed stream line");
                None
            }
        }
    }
}
