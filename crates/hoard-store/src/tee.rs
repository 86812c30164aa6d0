use std::io::{self, Read, Write};

/// Reader that copies every chunk it yields into a writer.
///
/// Whoever consumes the reader (normally a [`NamingStrategy`]) and the writer
/// observe exactly the same bytes in a single pass over the input, so the
/// identifier derived from the stream always describes what was written.
///
/// A failed write is reported as a read error so the consumer stops.
///
/// [`NamingStrategy`]: crate::naming::NamingStrategy
pub struct TeeReader<R, W> {
    reader: R,
    writer: W,
    bytes: u64,
}

impl<R: Read, W: Write> TeeReader<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            bytes: 0,
        }
    }

    /// Bytes read from the source and written to the sink so far.
    pub fn bytes_copied(&self) -> u64 {
        self.bytes
    }
}

impl<R: Read, W: Write> Read for TeeReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.writer
                .write_all(&buf[..n])
                .map_err(|e| io::Error::new(e.kind(), format!("failed to write staged bytes: {e}")))?;
            self.bytes += n as u64;
        }
        Ok(n)
    }
}
