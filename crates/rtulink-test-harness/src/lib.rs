//! rtulink-test-harness: Test utilities and mock transports for rtulink.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the RTU client without a serial device attached.

pub mod mock_serial;

pub use mock_serial::MockTransport;
