//! rtulink-core: Core traits, types, and error definitions for rtulink.
//!
//! This crate defines the pieces shared by every other rtulink crate: the
//! register data model, the byte-level [`Transport`] abstraction, and the
//! common [`Error`] type. Protocol code in `rtulink-rtu` and transports in
//! `rtulink-transport` depend on these types without depending on each other.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`FunctionCode`], [`RegisterCount`], [`ExceptionCode`] -- register data model
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use rtulink_core::*`.
pub use error::{Error, Result};
pub use transport::Transport;
pub use types::*;
