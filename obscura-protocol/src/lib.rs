//! Serial wire formats for the Obscura camera controller
//!
//! This crate defines the two UART-based formats the controller speaks:
//! inbound command frames from the host, and outbound log packets back to
//! the host's debug terminal.
//!
//! # Command frames (inbound)
//!
//! ```text
//! ┌────────┬──────────┬─────────┬─────────┬─────────────┐
//! │ MODULE │ FUNCTION │ LEN LO  │ LEN HI  │ PAYLOAD     │
//! │ 1B     │ 1B       │ 1B      │ 1B      │ 0–65535B    │
//! └────────┴──────────┴─────────┴─────────┴─────────────┘
//! ```
//!
//! There is no sync byte and no checksum - the sender owns framing, and the
//! receiver trusts its byte counter. The payload length is little-endian.
//!
//! # Log packets (outbound)
//!
//! ```text
//! ┌────────┬────────┬────────┬──────────┬─────────┬─────────┐
//! │ MODULE │ STATUS │ MSGLEN │ MSG      │ DATALEN │ DATA    │
//! │ 1B     │ 1B     │ 1B     │ 0–255B   │ 4B LE   │ 0..B    │
//! └────────┴────────┴────────┴──────────┴─────────┴─────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod log_packet;
pub mod modules;

pub use frame::{FrameHeader, FrameError, HEADER_LEN};
pub use log_packet::{LogPacket, MAX_LOG_DATA, MAX_LOG_MSG};
