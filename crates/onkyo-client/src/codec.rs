//! Newline framing for the daemon protocol.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::FramingError;

/// Longest inbound line accepted before the stream is considered garbage.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Splits the daemon byte stream into `\n`-terminated lines.
///
/// Unlike [`tokio_util::codec::LinesCodec`], bytes left over when the stream
/// ends are an error rather than a final line: the daemon always terminates
/// its lines, so a missing newline means the connection died mid-message.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Bytes already searched for a newline.
    scanned: usize,
}

impl LineCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = FramingError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, FramingError> {
        let Some(offset) = buf[self.scanned..].iter().position(|b| *b == b'\n') else {
            if buf.len() > MAX_LINE_LENGTH {
                return Err(FramingError::LineTooLong);
            }
            self.scanned = buf.len();
            return Ok(None);
        };

        let end = self.scanned + offset;
        self.scanned = 0;
        let frame = buf.split_to(end + 1);
        Ok(Some(String::from_utf8_lossy(&frame[..end]).into_owned()))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, FramingError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if buf.is_empty() {
            return Ok(None);
        }

        let leftover = buf.len();
        buf.clear();
        self.scanned = 0;
        Err(FramingError::Truncated(leftover))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = FramingError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), FramingError> {
        let line = line.as_ref();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
