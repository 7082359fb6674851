//! Turning the raw response body into parsed fragments.

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::Result;
use crate::provider::ByteStream;
use crate::types::{ChatChunk, FragmentParse, FramingMode};

/// Incremental UTF-8 decoder.
///
/// A multi-byte character split across two reads is held back until the rest
/// arrives. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8.
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.pending = rest.to_vec();
        out
    }

    /// Flush at end of stream; a dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Splits decoded text into JSON chunk objects according to a [`FramingMode`].
#[derive(Debug)]
pub struct FrameDecoder {
    mode: FramingMode,
    utf8: Utf8Decoder,
    buffer: String,
}

impl FrameDecoder {
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            utf8: Utf8Decoder::new(),
            buffer: String::new(),
        }
    }

    /// Feed one network read and return whatever it completes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<FragmentParse> {
        let text = self.utf8.decode(bytes);
        match self.mode {
            FramingMode::PerChunk => parse_single(&text).into_iter().collect(),
            FramingMode::Buffered => {
                self.buffer.push_str(&text);
                self.drain_complete()
            }
        }
    }

    /// Signal end of stream and return anything left over.
    pub fn finish(&mut self) -> Vec<FragmentParse> {
        let tail = self.utf8.finish();
        match self.mode {
            FramingMode::PerChunk => parse_single(&tail).into_iter().collect(),
            FramingMode::Buffered => {
                self.buffer.push_str(&tail);
                let mut out = self.drain_complete();
                let leftover = std::mem::take(&mut self.buffer);
                if !leftover.trim().is_empty() {
                    out.push(FragmentParse::Malformed(format!(
                        "incomplete JSON at end of stream: {}",
                        leftover.trim()
                    )));
                }
                out
            }
        }
    }

    fn drain_complete(&mut self) -> Vec<FragmentParse> {
        let mut out = Vec::new();
        loop {
            let mut values =
                serde_json::Deserializer::from_str(&self.buffer).into_iter::<ChatChunk>();
            let mut consumed = 0;
            let mut broken = None;
            loop {
                match values.next() {
                    Some(Ok(chunk)) => {
                        consumed = values.byte_offset();
                        out.push(chunk.into_parse());
                    }
                    Some(Err(err)) if err.is_eof() => break,
                    Some(Err(err)) => {
                        broken = Some(err.to_string());
                        break;
                    }
                    None => {
                        consumed = values.byte_offset();
                        break;
                    }
                }
            }
            self.buffer.drain(..consumed);

            let Some(reason) = broken else {
                return out;
            };
            // Drop the broken value up to the end of its line and try the rest.
            let start = self.buffer.len() - self.buffer.trim_start().len();
            let skip = match self.buffer[start..].find('\n') {
                Some(pos) => start + pos + 1,
                None => self.buffer.len(),
            };
            self.buffer.drain(..skip);
            out.push(FragmentParse::Malformed(reason));
            if self.buffer.is_empty() {
                return out;
            }
        }
    }
}

/// Parse one read as exactly one JSON value. Whitespace-only reads yield nothing.
fn parse_single(text: &str) -> Option<FragmentParse> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match serde_json::from_str::<ChatChunk>(trimmed) {
        Ok(chunk) => chunk.into_parse(),
        Err(err) => FragmentParse::Malformed(err.to_string()),
    })
}

/// Lazily decode a response body into fragments.
///
/// The stream is finite and cannot be restarted. A transport error is yielded
/// once and ends it.
pub fn fragments(
    bytes: ByteStream,
    mode: FramingMode,
) -> BoxStream<'static, Result<FragmentParse>> {
    let stream = async_stream::stream! {
        let mut decoder = FrameDecoder::new(mode);
        let mut bytes = bytes;
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for parsed in decoder.push(&chunk) {
                        yield Ok(parsed);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
        for parsed in decoder.finish() {
            yield Ok(parsed);
        }
    };
    Box::pin(stream)
}
