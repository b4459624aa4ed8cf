//! Board-agnostic command ingestion logic for the Obscura camera controller
//!
//! This crate contains everything between the serial receive interrupt and
//! the registered command handlers, with no hardware dependencies:
//!
//! - Command pool (allocation and lifecycle accounting)
//! - Bounded SPSC command queue with an explicit status state machine
//! - Byte-at-a-time frame decoder
//! - Handler registry and the consumer dispatch step
//! - Status taxonomy shared with the log link
//!
//! The producer side (decoder + `put`) runs in receive-interrupt context;
//! the consumer side (`get` + dispatch) runs in the foreground loop. The
//! queue is the only point where the two contexts meet.

#![no_std]

extern crate alloc;

pub mod decoder;
pub mod dispatch;
pub mod pool;
pub mod queue;
pub mod status;

pub use decoder::FrameDecoder;
pub use dispatch::{process_next, DispatchOutcome, Handler, HandlerTable};
pub use pool::{Command, CommandPool};
pub use queue::{CommandQueue, QueueState, Rejected};
pub use status::{HandlerError, Module, PoolError, PoolWarning, QueueError, RegistryError};
