//! Incremental UTF-8 Decoding
//!
//! The streaming endpoint delivers raw byte chunks with no alignment
//! guarantee: a multi-byte character can be split across two chunks. The
//! decoder keeps the incomplete trailing bytes of each chunk and prepends
//! them to the next one, so concatenating its per-chunk output always
//! equals decoding the whole stream at once. Invalid sequences become
//! U+FFFD, matching lossy decoding of the full stream.

/// Stateful UTF-8 decoder for byte-chunk streams.
///
/// Carries at most three pending bytes (the longest incomplete UTF-8
/// sequence prefix) between `decode` calls; `flush` drains whatever is
/// left when the stream ends.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning all complete characters seen so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_up_to]));
                    match err.error_len() {
                        // Invalid sequence: substitute and keep scanning
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid_up_to + bad..];
                        }
                        // Incomplete trailing sequence: hold it for the next chunk
                        None => {
                            self.carry = rest[valid_up_to..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Drain pending bytes at end of stream.
    ///
    /// A stream that ends mid-character yields replacement characters here,
    /// the same as lossy-decoding the truncated whole.
    pub fn flush(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.carry);
        String::from_utf8_lossy(&tail).into_owned()
    }
}
