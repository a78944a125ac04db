//! Transport trait for device communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a device.
//! `rtulink-transport` provides a serial port implementation; the
//! `rtulink-test-harness` crate provides a scripted mock, and `rtulink-rtu`
//! ships a simulated device.
//!
//! The protocol engine in `rtulink-rtu` operates on a `Transport` rather
//! than directly on a serial port, so the same client code runs against
//! real hardware and against deterministic test doubles.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Error, Result};

/// Asynchronous byte-level transport to a device.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Frame structure and validation belong to the protocol code that
/// consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the device.
    ///
    /// Implementations should block until all bytes have been written to
    /// the underlying transport.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the device into the provided buffer.
    ///
    /// Returns the number of bytes actually read, never more than
    /// `buf.len()`. Will wait up to `timeout` for data to arrive; returns
    /// [`Error::Timeout`] if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`].
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;

    /// Receive exactly `n` bytes, waiting at most `timeout` in total.
    ///
    /// Each underlying `receive` is offered only the bytes still missing, so
    /// this never consumes data belonging to a later frame. Returns
    /// [`Error::Timeout`] if the deadline passes first and
    /// [`Error::ConnectionLost`] if the transport reports end of stream.
    async fn receive_exact(&mut self, n: usize, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut buf = vec![0u8; n];
        let mut filled = 0;

        while filled < n {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            let got = self.receive(&mut buf[filled..], remaining).await?;
            if got == 0 {
                return Err(Error::ConnectionLost);
            }
            filled += got;
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out queued bytes at most `chunk` at a time.
    struct ChunkedTransport {
        pending: VecDeque<u8>,
        chunk: usize,
        eof: bool,
        requested: Vec<usize>,
    }

    impl ChunkedTransport {
        fn new(data: &[u8], chunk: usize) -> Self {
            ChunkedTransport {
                pending: data.iter().copied().collect(),
                chunk,
                eof: false,
                requested: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Transport for ChunkedTransport {
        async fn send(&mut self, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            self.requested.push(buf.len());
            if self.pending.is_empty() {
                return if self.eof { Ok(0) } else { Err(Error::Timeout) };
            }
            let n = buf.len().min(self.chunk).min(self.pending.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.pending.pop_front().unwrap();
            }
            Ok(n)
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn receive_exact_assembles_chunks() {
        let mut t = ChunkedTransport::new(&[1, 2, 3, 4, 5, 6, 7], 2);
        let got = t.receive_exact(5, Duration::from_millis(100)).await.unwrap();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
        // Only the missing bytes are ever requested.
        assert_eq!(t.requested, vec![5, 3, 1]);
        assert_eq!(t.pending.len(), 2);
    }

    #[tokio::test]
    async fn receive_exact_zero_bytes() {
        let mut t = ChunkedTransport::new(&[], 4);
        let got = t.receive_exact(0, Duration::from_millis(10)).await.unwrap();
        assert!(got.is_empty());
        assert!(t.requested.is_empty());
    }

    #[tokio::test]
    async fn receive_exact_short_read_times_out() {
        let mut t = ChunkedTransport::new(&[1, 2], 8);
        let result = t.receive_exact(3, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn receive_exact_end_of_stream() {
        let mut t = ChunkedTransport::new(&[1], 8);
        t.eof = true;
        let result = t.receive_exact(3, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::ConnectionLost)));
    }
}
