//! Modbus RTU holding-register protocol for rtulink.
//!
//! This crate implements the two-operation RTU protocol spoken by rtulink
//! devices: write one 16-bit holding register, and read a block of up to 127
//! of them. It provides:
//!
//! - **Checksum** ([`crc`]) -- CRC-16 (reflected polynomial `0xA001`, seed `0xFFFF`).
//! - **Request encoding** ([`frame`]) -- build request frames with their
//!   checksum trailer.
//! - **Response decoding** ([`response`]) -- validate function code,
//!   checksum, and length; decode exception replies.
//! - **Register conversion** ([`registers`]) -- big-endian wire data to host
//!   integers.
//! - **RtuClient** ([`client`]) -- async request/response over a
//!   [`Transport`](rtulink_core::Transport), built with [`RtuClientBuilder`].
//! - **Device side** ([`responder`], [`simulator`]) -- answer requests from a
//!   register bank, in process or behind a simulated transport.
//!
//! The codec modules are pure functions over byte slices; only the client
//! performs I/O.
//!
//! # Example
//!
//! ```
//! use rtulink_rtu::frame::encode_read;
//! use rtulink_rtu::response::decode_read_response;
//!
//! let request = encode_read(0x1234, 4).unwrap();
//! assert_eq!(request.as_bytes(), &[0x01, 0x03, 0x12, 0x34, 0x00, 0x04, 0x00, 0xBF]);
//!
//! let reply = [
//!     0x01, 0x03, 0x08, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x93, 0xA6,
//! ];
//! let values = decode_read_response(&request, &reply).unwrap();
//! assert_eq!(values, vec![0x0001, 0x0203, 0x0405, 0x0607]);
//! ```

pub mod builder;
pub mod client;
pub mod crc;
pub mod frame;
pub mod registers;
pub mod responder;
pub mod response;
pub mod simulator;

pub use builder::RtuClientBuilder;
pub use client::RtuClient;
pub use frame::{encode_read, encode_write, Frame};
pub use responder::{RegisterBank, RegisterMap, Responder};
pub use response::{decode_read_response, decode_write_response};
pub use simulator::SimulatedDevice;
