//! Mock transport for deterministic testing of the RTU client.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. Tests script the exact frame the client must
//! send and the bytes the "device" answers with, including corrupted
//! checksums, wrong function codes, and truncated replies.
//!
//! # Example
//!
//! ```
//! use rtulink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Write 0x1234 to register 0: the device echoes the request.
//! let frame = [0x01, 0x06, 0x00, 0x00, 0x12, 0x34, 0x84, 0xBD];
//! mock.expect(&frame, &frame);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use rtulink_core::error::{Error, Result};
use rtulink_core::transport::Transport;

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing protocol code without hardware.
///
/// Expectations are consumed in order. Each `send()` is recorded and must
/// match the next expectation exactly; its response then becomes readable
/// through `receive()`. Sending with no expectation left, or sending the
/// wrong bytes, fails with [`Error::Protocol`]. Reading with nothing
/// pending fails with [`Error::Timeout`], like a silent device.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// Response bytes not yet handed out by `receive()`.
    pending: VecDeque<u8>,
    /// Upper bound on bytes returned per `receive()`, to mimic a serial
    /// driver delivering a frame in pieces.
    max_chunk: usize,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending: VecDeque::new(),
            max_chunk: usize::MAX,
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// An empty `response` models a device that never answers.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Deliver responses at most `max_chunk` bytes per `receive()` call.
    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk.max(1);
        self
    }

    /// All data sent through this transport, one element per `send()`.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of expectations not yet consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Number of response bytes still waiting to be received.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let expectation = self.expectations.pop_front().ok_or_else(|| {
            Error::Protocol("no more expectations in mock transport".into())
        })?;
        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }

        // Anything left over from the previous exchange is line noise the
        // client chose not to read; a new request starts clean.
        self.pending.clear();
        self.pending.extend(expectation.response);
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.pending.is_empty() {
            return Err(Error::Timeout);
        }

        let n = buf.len().min(self.max_chunk).min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRITE_FRAME: [u8; 8] = [0x01, 0x06, 0x00, 0x00, 0x12, 0x34, 0x84, 0xBD];

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(&WRITE_FRAME, &WRITE_FRAME);

        mock.send(&WRITE_FRAME).await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &WRITE_FRAME);
    }

    #[tokio::test]
    async fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01, 0x02], &[0xFF]);
        mock.expect(&[0x03, 0x04], &[0xFE]);

        mock.send(&[0x01, 0x02]).await.unwrap();
        mock.send(&[0x03, 0x04]).await.unwrap();

        assert_eq!(mock.sent_data(), &[vec![0x01, 0x02], vec![0x03, 0x04]]);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xFF]);

        let result = mock.send(&[0x99]).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();
        let result = mock.send(&[0x01]).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_silent_device_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(&WRITE_FRAME, &[]);
        mock.send(&WRITE_FRAME).await.unwrap();

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn mock_transport_chunked_receive() {
        let mut mock = MockTransport::new().with_max_chunk(3);
        mock.expect(&WRITE_FRAME, &WRITE_FRAME);
        mock.send(&WRITE_FRAME).await.unwrap();

        let mut buf = [0u8; 8];
        let n = mock
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(mock.pending_bytes(), 5);

        let got = mock
            .receive_exact(5, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(got, &WRITE_FRAME[3..]);
        assert_eq!(mock.pending_bytes(), 0);
    }

    #[tokio::test]
    async fn mock_transport_new_request_discards_leftovers() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xAA, 0xBB]);
        mock.expect(&[0x02], &[0xCC]);

        mock.send(&[0x01]).await.unwrap();
        mock.send(&[0x02]).await.unwrap();

        let got = mock
            .receive_exact(1, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(got, vec![0xCC]);
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(&[0x01]).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn mock_transport_set_connected() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
