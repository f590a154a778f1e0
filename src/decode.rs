use crate::error::KtResult;
use std::collections::VecDeque;
use std::io::BufRead;

/// Maps ISO-8859-1 bytes to chars. Every byte is a valid code point, so this
/// never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Physical lines of an ISO-8859-1 byte stream.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line; the terminator is not
/// part of the yielded text.
pub struct Latin1Lines<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<String>,
}

impl<R: BufRead> Latin1Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            pending: VecDeque::new(),
        }
    }

    pub fn next_line(&mut self) -> KtResult<Option<String>> {
        if self.pending.is_empty() && !self.fill_pending()? {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }

    fn fill_pending(&mut self) -> KtResult<bool> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(false);
        }

        let text = decode_latin1(&self.buf);
        let body = text.strip_suffix('\n').unwrap_or(text.as_str());
        let body = body.strip_suffix('\r').unwrap_or(body);
        // Any CR left inside the chunk is a terminator of its own.
        self.pending.extend(body.split('\r').map(str::to_owned));
        Ok(true)
    }
}
