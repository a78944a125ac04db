//! Async RTU client.
//!
//! [`RtuClient`] drives one request/response exchange at a time over a
//! [`Transport`]: encode the request, send it, read the 3-byte header, read
//! exactly the remainder the header announces, then validate.
//!
//! The client owns its transport and every operation borrows the client
//! mutably, so a second request cannot start while one is in flight. A
//! failed exchange is returned to the caller as-is; nothing is retried.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use rtulink_core::error::{Error, Result};
use rtulink_core::transport::Transport;
use rtulink_core::{RegisterAddress, RegisterValue, WriteAck};

use crate::frame::{self, Frame};
use crate::response::{self, HEADER_LEN};

/// Default time allowed for each response.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Client for a single RTU device on an exclusively owned transport.
pub struct RtuClient {
    transport: Box<dyn Transport>,
    response_timeout: Duration,
}

impl RtuClient {
    /// Wrap a connected transport.
    pub fn new(transport: Box<dyn Transport>, response_timeout: Duration) -> Self {
        RtuClient {
            transport,
            response_timeout,
        }
    }

    /// Time allowed for each response to arrive completely.
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Write `value` to the holding register at `address`.
    ///
    /// Succeeds once the device has echoed the request back unchanged.
    pub async fn write_register(
        &mut self,
        address: RegisterAddress,
        value: RegisterValue,
    ) -> Result<WriteAck> {
        let request = frame::encode_write(address, value);
        debug!(address, value, "write single register");

        let response = self.exchange(&request).await?;
        response::decode_write_response(&request, &response)
    }

    /// Read `count` consecutive holding registers starting at `address`.
    ///
    /// `count` must be in `1..=127`; anything else fails with
    /// [`Error::InvalidArgument`](rtulink_core::Error::InvalidArgument)
    /// before any bytes are sent.
    pub async fn read_holding_registers(
        &mut self,
        address: RegisterAddress,
        count: u16,
    ) -> Result<Vec<RegisterValue>> {
        let request = frame::encode_read(address, count)?;
        debug!(address, count, "read holding registers");

        let response = self.exchange(&request).await?;
        let values = response::decode_read_response(&request, &response)?;
        debug!(address, values = ?values, "read complete");
        Ok(values)
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Give the transport back, e.g. to hand it to another client.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    /// Send `request` and collect exactly the bytes of its response.
    ///
    /// The header decides how much follows: the expected response length
    /// for a matching function code, or the short exception frame. A
    /// function byte that is neither fails here, before the body is read.
    /// Header and body share one deadline of `response_timeout`.
    async fn exchange(&mut self, request: &Frame) -> Result<Vec<u8>> {
        self.transport.send(request.as_bytes()).await?;
        let deadline = Instant::now() + self.response_timeout;

        let mut response = self
            .transport
            .receive_exact(HEADER_LEN, self.response_timeout)
            .await?;
        let total = response::response_len(request, &response)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!(function = %request.function(), "response deadline passed after header");
            return Err(Error::Timeout);
        }
        let body = self
            .transport
            .receive_exact(total - HEADER_LEN, remaining)
            .await?;
        response.extend_from_slice(&body);

        tracing::trace!(request = ?request.as_bytes(), response = ?response, "exchange complete");
        Ok(response)
    }
}
