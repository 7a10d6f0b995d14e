//! Reversal of chunked transfer-encoding.
//!
//! # Design
//! The whole body is already in memory, so decoding is a single pass over a
//! byte slice driven by a three-state machine. A size line that does not
//! start with a hex digit ends decoding instead of failing the response: the
//! prefix decoded so far is kept and the remaining bytes are dropped. Trailer
//! headers after the zero-size chunk are discarded, never merged into the
//! response headers.

use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadSize,
    ReadData(usize),
    Done,
}

/// Concatenate the payloads of every chunk in `body`.
pub fn decode(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut rest = body;
    let mut state = State::ReadSize;

    loop {
        state = match state {
            State::ReadSize => {
                let Some(end) = find_crlf(rest) else {
                    break;
                };
                let line = &rest[..end];
                rest = &rest[end + 2..];
                match parse_size(line) {
                    Some(0) => State::Done,
                    Some(size) => {
                        trace!(size, "chunk");
                        State::ReadData(size)
                    }
                    None => {
                        warn!(
                            line = %String::from_utf8_lossy(line),
                            "invalid chunk size line, truncating body"
                        );
                        State::Done
                    }
                }
            }
            State::ReadData(size) => {
                let take = size.min(rest.len());
                out.extend_from_slice(&rest[..take]);
                // payload plus its trailing CRLF
                rest = rest.get(size.saturating_add(2)..).unwrap_or(&[]);
                State::ReadSize
            }
            State::Done => break,
        };
    }
    out
}

/// Value of the leading hex run of a size line; extensions after it are ignored.
fn parse_size(line: &[u8]) -> Option<usize> {
    let digits = line.iter().take_while(|b| b.is_ascii_hexdigit()).count();
    if digits == 0 {
        return None;
    }
    let hex = std::str::from_utf8(&line[..digits]).ok()?;
    usize::from_str_radix(hex, 16).ok()
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wikipedia_example() {
        assert_eq!(decode(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n"), b"Wikipedia");
    }

    #[test]
    fn hex_sizes_are_case_insensitive() {
        let body = b"a\r\n0123456789\r\nA\r\nabcdefghij\r\n0\r\n\r\n";
        assert_eq!(decode(body), b"0123456789abcdefghij");
    }

    #[test]
    fn chunk_extensions_are_ignored() {
        assert_eq!(decode(b"5;name=value\r\nhello\r\n0\r\n\r\n"), b"hello");
    }

    #[test]
    fn trailers_are_dropped() {
        let body = b"3\r\nabc\r\n0\r\nX-Checksum: 42\r\n\r\n";
        assert_eq!(decode(body), b"abc");
    }

    #[test]
    fn malformed_size_line_keeps_decoded_prefix() {
        let body = b"3\r\nabc\r\nzz\r\nnever\r\n0\r\n\r\n";
        assert_eq!(decode(body), b"abc");
    }

    #[test]
    fn payload_may_contain_crlf() {
        assert_eq!(decode(b"4\r\na\r\nb\r\n0\r\n\r\n"), b"a\r\nb");
    }

    #[test]
    fn truncated_chunk_yields_available_bytes() {
        assert_eq!(decode(b"a\r\nshort"), b"short");
    }

    #[test]
    fn missing_terminal_chunk_stops_at_end() {
        assert_eq!(decode(b"2\r\nok\r\n"), b"ok");
    }

    #[test]
    fn empty_body_decodes_to_empty() {
        assert!(decode(b"").is_empty());
    }

    #[test]
    fn oversized_hex_terminates() {
        assert!(decode(b"ffffffffffffffffffffffff\r\nabc\r\n").is_empty());
    }
}
