//! Status taxonomy for the command path.
//!
//! Each concern gets its own error type instead of one status byte shared
//! across unrelated enumerations; the raw byte only reappears at the log
//! link, where `wire_code` maps every member into the host's severity
//! ranges (INFO 0-19, WARN 20-39, ERR 40-59).

use obscura_protocol::log_packet::{STATUS_ERR_BASE, STATUS_INFO_BASE, STATUS_WARN_BASE};
use obscura_protocol::modules;

/// Wire status code for a successful operation
pub const STATUS_OK: u8 = STATUS_INFO_BASE;

/// Modules that can originate log records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Module {
    /// The log link itself
    Log,
    /// Command ingestion (decoder, queue, pool, dispatch)
    Cmd,
    /// System-level handlers (ping, echo)
    Sys,
    /// Camera sensor collaborator
    Camera,
    /// External SDRAM collaborator
    Sdram,
}

impl Module {
    /// Wire id used in frames and log packets
    pub fn id(self) -> u8 {
        match self {
            Module::Log => modules::MODULE_LOG,
            Module::Cmd => modules::MODULE_CMD,
            Module::Sys => modules::MODULE_SYS,
            Module::Camera => modules::MODULE_CAMERA,
            Module::Sdram => modules::MODULE_SDRAM,
        }
    }
}

/// Errors from queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// `put` on a full queue
    Full,
    /// `get` on an empty queue
    Empty,
    /// Queue status byte held an unrecognized value
    Invalid,
}

impl QueueError {
    /// Wire status code for the log link
    pub fn wire_code(self) -> u8 {
        match self {
            QueueError::Full => STATUS_ERR_BASE + 1,
            QueueError::Empty => STATUS_ERR_BASE + 2,
            QueueError::Invalid => STATUS_ERR_BASE + 3,
        }
    }
}

/// Errors from pool allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// Payload storage could not be obtained
    AllocFailed,
}

impl PoolError {
    /// Wire status code for the log link
    pub fn wire_code(self) -> u8 {
        match self {
            PoolError::AllocFailed => STATUS_ERR_BASE,
        }
    }
}

/// Non-fatal anomalies absorbed by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolWarning {
    /// `deallocate` on an already-released command
    DoubleFree,
}

impl PoolWarning {
    /// Wire status code for the log link
    pub fn wire_code(self) -> u8 {
        match self {
            PoolWarning::DoubleFree => STATUS_WARN_BASE,
        }
    }
}

/// Wire status code reported when no handler matches a command
pub const STATUS_UNKNOWN_COMMAND: u8 = STATUS_WARN_BASE + 1;

/// Errors from handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Handler table is at capacity
    TableFull,
    /// A handler is already registered for the pair
    Duplicate,
}

impl RegistryError {
    /// Wire status code for the log link
    pub fn wire_code(self) -> u8 {
        match self {
            RegistryError::TableFull => STATUS_ERR_BASE + 4,
            RegistryError::Duplicate => STATUS_ERR_BASE + 5,
        }
    }
}

/// Failure reported by a command handler
///
/// Carries the module-specific status code the handler wants on the log
/// link; dispatch itself only records that the handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandlerError {
    /// Module-specific status code, expected in the ERR range
    pub code: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use obscura_protocol::log_packet::STATUS_END;

    #[test]
    fn test_module_ids_match_wire_constants() {
        assert_eq!(Module::Log.id(), 0x00);
        assert_eq!(Module::Cmd.id(), 0x01);
        assert_eq!(Module::Camera.id(), 0x03);
    }

    #[test]
    fn test_wire_codes_stay_in_severity_ranges() {
        for err in [QueueError::Full, QueueError::Empty, QueueError::Invalid] {
            assert!(err.wire_code() >= STATUS_ERR_BASE && err.wire_code() < STATUS_END);
        }
        assert!(PoolError::AllocFailed.wire_code() >= STATUS_ERR_BASE);
        let warn = PoolWarning::DoubleFree.wire_code();
        assert!(warn >= STATUS_WARN_BASE && warn < STATUS_ERR_BASE);
        assert!(STATUS_UNKNOWN_COMMAND >= STATUS_WARN_BASE && STATUS_UNKNOWN_COMMAND < STATUS_ERR_BASE);
    }
}
