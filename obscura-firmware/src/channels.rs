//! Shared command-path singletons
//!
//! The queue and pool are the only state shared between the receive
//! interrupt side and the foreground dispatcher; both are constructed here
//! and referenced by the tasks, never duplicated. The log channel carries
//! records to the host debug link.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use obscura_core::status::Module;
use obscura_core::{CommandPool, CommandQueue};
use obscura_protocol::log_packet::MAX_LOG_DATA;

/// Command queue capacity; fixed for the queue's lifetime
pub const CMD_QUEUE_CAP: usize = 8;

/// Handler table capacity
pub const HANDLER_TABLE_CAP: usize = 16;

/// Log channel depth
const LOG_CHANNEL_SIZE: usize = 8;

/// The command queue: the receive interrupt produces, the dispatcher consumes
pub static CMD_QUEUE: CommandQueue<CMD_QUEUE_CAP> = CommandQueue::new();

/// Lifecycle ledger for command payload buffers
pub static CMD_POOL: CommandPool = CommandPool::new();

/// Records awaiting transmission on the host log link
pub static LOG_CHANNEL: Channel<CriticalSectionRawMutex, LogRecord, LOG_CHANNEL_SIZE> =
    Channel::new();

/// One record for the host log link
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Originating module
    pub module: Module,
    /// Wire status code
    pub status: u8,
    /// Human-readable message, possibly empty
    pub message: &'static str,
    /// Binary attachment, truncated to the packet maximum
    pub data: Vec<u8, MAX_LOG_DATA>,
}

impl LogRecord {
    /// Record with a status code only
    pub fn status_only(module: Module, status: u8) -> Self {
        Self {
            module,
            status,
            message: "",
            data: Vec::new(),
        }
    }

    /// Record with a message
    pub fn message(module: Module, status: u8, message: &'static str) -> Self {
        Self {
            module,
            status,
            message,
            data: Vec::new(),
        }
    }

    /// Record with a message and a binary attachment
    pub fn with_data(module: Module, status: u8, message: &'static str, data: &[u8]) -> Self {
        let mut vec = Vec::new();
        let take = data.len().min(MAX_LOG_DATA);
        // Cannot fail: take is bounded by the Vec capacity
        let _ = vec.extend_from_slice(&data[..take]);

        Self {
            module,
            status,
            message,
            data: vec,
        }
    }
}

/// Queue a record for the host log link, dropping it if the channel is full
///
/// The log link has the same backpressure policy as the command queue:
/// drop and note, never block.
pub fn log_report(record: LogRecord) {
    if LOG_CHANNEL.try_send(record).is_err() {
        defmt::warn!("Log channel full, dropping record");
    }
}
