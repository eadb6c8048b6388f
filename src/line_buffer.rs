// src/line_buffer.rs

/// Turns arbitrarily sized byte chunks into complete lines
///
/// Bytes are buffered until a `\n` arrives, so multi-byte UTF-8 sequences
/// split across chunks are decoded intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(decode(&self.pending));
            self.pending.clear();
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);

        lines
    }

    /// Returns the unterminated trailing line, if any, once the stream ends
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode(&self.pending);
        self.pending.clear();
        Some(line)
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_partial_line_between_chunks() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed(b"commit ab"), Vec::<String>::new());
        assert_eq!(buffer.feed(b"c\nAuthor: x\nDa"), vec!["commit abc", "Author: x"]);
        assert_eq!(buffer.feed(b"te: y\n"), vec!["Date: y"]);
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn flush_returns_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed(b"one\ntwo"), vec!["one"]);
        assert_eq!(buffer.flush(), Some("two".to_string()));
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn preserves_empty_lines_and_strips_cr() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed(b"a\r\n\r\n\nb\n"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn split_utf8_sequence_is_reassembled() {
        let text = "    Füge Übersetzung hinzu\n".as_bytes();
        let mut buffer = LineBuffer::new();
        let mut lines = Vec::new();
        for byte in text {
            lines.extend(buffer.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(lines, vec!["    Füge Übersetzung hinzu"]);
    }
}
