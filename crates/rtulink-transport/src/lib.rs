//! Transport implementations for rtulink.
//!
//! This crate provides [`SerialTransport`], the concrete implementation of
//! the [`Transport`](rtulink_core::Transport) trait for USB virtual COM ports
//! and RS-232/RS-485 adapters.
//!
//! # Example
//!
//! ```no_run
//! use rtulink_transport::SerialTransport;
//! use rtulink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> rtulink_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyACM0", 115_200).await?;
//!
//! // Read four holding registers starting at 0x1234 from unit 1.
//! transport.send(&[0x01, 0x03, 0x12, 0x34, 0x00, 0x04, 0x00, 0xBF]).await?;
//!
//! let header = transport.receive_exact(3, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{SerialTransport, DEFAULT_BAUD_RATE};
