//! Command pool: allocation and lifecycle accounting.
//!
//! A [`Command`] owns its payload buffer; dropping one releases the storage
//! either way. Going through [`CommandPool::deallocate`] additionally keeps
//! the live count honest and turns a repeated release into a warning
//! instead of a fault.

use alloc::vec::Vec;
use portable_atomic::{AtomicUsize, Ordering};

use crate::status::{PoolError, PoolWarning};

/// A fully decoded unit of work, ready for dispatch
///
/// Only ever observed fully populated: the decoder hands one out strictly
/// after the last payload byte has landed.
#[derive(Debug)]
pub struct Command {
    module: u8,
    function: u8,
    data_len: u16,
    /// Payload storage; `None` once released back to the pool
    data: Option<Vec<u8>>,
}

impl Command {
    /// Target module id
    pub fn module(&self) -> u8 {
        self.module
    }

    /// Function id within the module
    pub fn function(&self) -> u8 {
        self.function
    }

    /// Declared payload length
    pub fn data_len(&self) -> u16 {
        self.data_len
    }

    /// Payload bytes; empty once released
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Whether the payload has been released back to the pool
    pub fn is_released(&self) -> bool {
        self.data.is_none()
    }

    /// Mutable payload access for the decoder
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }
}

/// Allocation front-end and lifecycle ledger for commands
///
/// The pool does not own storage itself; payloads come from the global
/// allocator. What it owns is the accounting: how many commands are live,
/// the high-water mark, and how many double releases have been absorbed.
#[derive(Debug)]
pub struct CommandPool {
    live: AtomicUsize,
    high_water: AtomicUsize,
    double_frees: AtomicUsize,
}

impl CommandPool {
    /// Create a pool with zeroed accounting
    pub const fn new() -> Self {
        Self {
            live: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            double_frees: AtomicUsize::new(0),
        }
    }

    /// Allocate a command with a zeroed payload buffer of exactly `data_len` bytes
    ///
    /// Fails with [`PoolError::AllocFailed`] when the storage cannot be
    /// obtained. During bring-up that is fatal; at steady state the caller
    /// logs it and abandons the in-flight frame.
    pub fn allocate(&self, module: u8, function: u8, data_len: u16) -> Result<Command, PoolError> {
        let mut data = Vec::new();
        data.try_reserve_exact(data_len as usize)
            .map_err(|_| PoolError::AllocFailed)?;
        data.resize(data_len as usize, 0);

        let live = self.live.fetch_add(1, Ordering::Relaxed) + 1;
        self.high_water.fetch_max(live, Ordering::Relaxed);

        Ok(Command {
            module,
            function,
            data_len,
            data: Some(data),
        })
    }

    /// Release a command's payload storage
    ///
    /// Releasing an already-released command is not a fault: the pool
    /// records a [`PoolWarning::DoubleFree`] and changes nothing.
    pub fn deallocate(&self, cmd: &mut Command) -> Result<(), PoolWarning> {
        match cmd.data.take() {
            Some(_buf) => {
                self.live.fetch_sub(1, Ordering::Relaxed);
                Ok(())
            }
            None => {
                self.double_frees.fetch_add(1, Ordering::Relaxed);
                Err(PoolWarning::DoubleFree)
            }
        }
    }

    /// Commands currently allocated and not yet released
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Highest simultaneous live count observed
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::Relaxed)
    }

    /// Double releases absorbed so far
    pub fn double_frees(&self) -> usize {
        self.double_frees.load(Ordering::Relaxed)
    }
}

impl Default for CommandPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sets_fields_and_zeroes_payload() {
        let pool = CommandPool::new();
        let cmd = pool.allocate(0x03, 0x02, 8).unwrap();

        assert_eq!(cmd.module(), 0x03);
        assert_eq!(cmd.function(), 0x02);
        assert_eq!(cmd.data_len(), 8);
        assert_eq!(cmd.data(), &[0u8; 8]);
        assert!(!cmd.is_released());
    }

    #[test]
    fn test_allocate_empty_payload() {
        let pool = CommandPool::new();
        let cmd = pool.allocate(0x01, 0x01, 0).unwrap();

        assert_eq!(cmd.data_len(), 0);
        assert!(cmd.data().is_empty());
        assert!(!cmd.is_released());
    }

    #[test]
    fn test_deallocate_twice_warns_second_time() {
        let pool = CommandPool::new();
        let mut cmd = pool.allocate(0x01, 0x01, 4).unwrap();

        assert_eq!(pool.deallocate(&mut cmd), Ok(()));
        assert!(cmd.is_released());

        // Second release is absorbed, not a fault
        assert_eq!(pool.deallocate(&mut cmd), Err(PoolWarning::DoubleFree));
        assert_eq!(pool.double_frees(), 1);

        // Accounting is not corrupted by the double release
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_live_and_high_water_accounting() {
        let pool = CommandPool::new();

        let mut a = pool.allocate(1, 1, 1).unwrap();
        let mut b = pool.allocate(1, 2, 1).unwrap();
        let mut c = pool.allocate(1, 3, 1).unwrap();
        assert_eq!(pool.live(), 3);

        pool.deallocate(&mut a).unwrap();
        pool.deallocate(&mut b).unwrap();
        assert_eq!(pool.live(), 1);
        assert_eq!(pool.high_water(), 3);

        pool.deallocate(&mut c).unwrap();
        assert_eq!(pool.live(), 0);
    }
}
