//! Bridges between async request/response bodies and the blocking store.
//!
//! Uploads: the handler pushes multipart chunks into a bounded channel and a
//! [`ChannelReader`] on a blocking thread hands them to the store as a plain
//! `Read`. Downloads: [`stream_reader`] pumps an object's reader from a
//! blocking thread into a channel that backs the response body.

use std::io::{self, Read};

use axum::body::Body;
use bytes::Bytes;
use hoard_crypto::CHUNK_SIZE;
use tokio::sync::mpsc;

/// Chunks buffered between the async and blocking halves.
pub const CHANNEL_CAPACITY: usize = 8;

/// Blocking `Read` over chunks received from a tokio channel.
///
/// End of stream is the sender being dropped. An `Err` item is returned from
/// `read` as-is, so an aborted upload fails the save.
///
/// Must be read from a blocking thread, never from an async task.
pub struct ChannelReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    current: Bytes,
}

impl ChannelReader {
    pub fn new(rx: mpsc::Receiver<io::Result<Bytes>>) -> Self {
        Self {
            rx,
            current: Bytes::new(),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.current.is_empty() {
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.current.len());
        let head = self.current.split_to(n);
        buf[..n].copy_from_slice(&head);
        Ok(n)
    }
}

/// Stream `reader` as a response body, emitting `head` first.
///
/// Reading happens on a blocking thread. If the client goes away the send
/// fails and the thread stops, dropping the reader.
pub fn stream_reader(mut reader: Box<dyn Read + Send>, head: Vec<u8>) -> Body {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_CAPACITY);
    tokio::task::spawn_blocking(move || {
        if !head.is_empty() && tx.blocking_send(Ok(Bytes::from(head))).is_err() {
            return;
        }
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx
                        .blocking_send(Ok(Bytes::copy_from_slice(&buf[..n])))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "object read failed mid-stream");
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    Body::from_stream(stream)
}

/// Read up to `limit` bytes from the front of `reader`.
pub fn read_head<R: Read + ?Sized>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut head = vec![0u8; limit];
    let mut filled = 0;
    while filled < limit {
        match reader.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    head.truncate(filled);
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn channel_reader_concatenates_chunks() {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tx.try_send(Ok(Bytes::from_static(b"hello "))).unwrap();
        tx.try_send(Ok(Bytes::new())).unwrap();
        tx.try_send(Ok(Bytes::from_static(b"world"))).unwrap();
        drop(tx);

        let mut out = Vec::new();
        ChannelReader::new(rx).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn channel_reader_small_buffer() {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tx.try_send(Ok(Bytes::from_static(b"abcdef"))).unwrap();
        drop(tx);

        let mut reader = ChannelReader::new(rx);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn channel_reader_surfaces_errors() {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tx.try_send(Ok(Bytes::from_static(b"partial"))).unwrap();
        tx.try_send(Err(io::Error::new(io::ErrorKind::ConnectionAborted, "client gone")))
            .unwrap();

        let mut out = Vec::new();
        let err = ChannelReader::new(rx).read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
    }

    #[test]
    fn channel_reader_across_threads() {
        let (tx, rx) = mpsc::channel(1);
        let producer = std::thread::spawn(move || {
            for i in 0..100u8 {
                tx.blocking_send(Ok(Bytes::from(vec![i; 10]))).unwrap();
            }
        });
        let mut out = Vec::new();
        ChannelReader::new(rx).read_to_end(&mut out).unwrap();
        producer.join().unwrap();
        assert_eq!(out.len(), 1000);
        assert_eq!(out[999], 99);
    }

    #[test]
    fn read_head_stops_at_limit_or_eof() {
        let mut short = Cursor::new(b"tiny".to_vec());
        assert_eq!(read_head(&mut short, 512).unwrap(), b"tiny");

        let mut long = Cursor::new(vec![7u8; 2000]);
        assert_eq!(read_head(&mut long, 512).unwrap().len(), 512);
        assert_eq!(long.position(), 512);
    }

    #[tokio::test]
    async fn stream_reader_emits_head_then_rest() {
        let body = stream_reader(
            Box::new(Cursor::new(b" and the rest".to_vec())),
            b"head".to_vec(),
        );
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"head and the rest");
    }
}
