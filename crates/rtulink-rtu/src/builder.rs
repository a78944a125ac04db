//! RtuClientBuilder -- fluent builder for constructing [`RtuClient`] instances.
//!
//! Separates configuration from construction so that callers can set the
//! serial port, baud rate, and timing before the port is opened.
//!
//! # Example
//!
//! ```no_run
//! use rtulink_rtu::RtuClientBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> rtulink_core::Result<()> {
//! let mut client = RtuClientBuilder::new()
//!     .serial_port("/dev/ttyACM0")
//!     .baud_rate(115_200)
//!     .settle_delay(Duration::from_secs(2))
//!     .build()
//!     .await?;
//!
//! client.write_register(0, 0x1234).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rtulink_core::error::{Error, Result};
use rtulink_core::transport::Transport;
use rtulink_transport::DEFAULT_BAUD_RATE;

use crate::client::{RtuClient, DEFAULT_RESPONSE_TIMEOUT};

/// Fluent builder for [`RtuClient`].
#[derive(Debug, Clone)]
pub struct RtuClientBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    response_timeout: Duration,
    settle_delay: Duration,
}

impl RtuClientBuilder {
    /// Create a builder with default settings: 115200 baud, 1 s response
    /// timeout, no settle delay.
    pub fn new() -> Self {
        RtuClientBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            settle_delay: Duration::ZERO,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyACM0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Set the baud rate (default: 115200).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set how long to wait for each response (default: 1 s).
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Wait this long after opening the port before returning the client.
    ///
    /// Boards that reset when their USB serial port is opened need a moment
    /// to boot; two seconds covers the common Arduino bootloaders.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Build an [`RtuClient`] with a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` from
    /// `rtulink-test-harness` or a [`SimulatedDevice`](crate::SimulatedDevice)).
    /// The settle delay is not applied.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<RtuClient> {
        if self.response_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "response_timeout must be greater than zero".into(),
            ));
        }
        Ok(RtuClient::new(transport, self.response_timeout))
    }

    /// Open the configured serial port and build an [`RtuClient`] on it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<RtuClient> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidArgument("serial_port is required for build()".into()))?;

        let transport = rtulink_transport::SerialTransport::open(port, self.baud_rate).await?;

        if !self.settle_delay.is_zero() {
            tracing::debug!(
                port = %port,
                delay_ms = self.settle_delay.as_millis() as u64,
                "waiting for device to settle"
            );
            tokio::time::sleep(self.settle_delay).await;
        }

        self.build_with_transport(Box::new(transport))
    }
}

impl Default for RtuClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
