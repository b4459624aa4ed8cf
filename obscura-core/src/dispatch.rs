//! Handler registry and the consumer dispatch step.
//!
//! The foreground loop repeatedly calls [`process_next`]: dequeue, look up
//! the handler for the (module, function) pair, invoke it, then release
//! the command. Ownership transfer is unconditional - the command is
//! released exactly once whether the handler succeeded, failed, or was
//! never found.

use heapless::Vec;

use crate::pool::{Command, CommandPool};
use crate::queue::CommandQueue;
use crate::status::{HandlerError, QueueError, RegistryError};

/// A registered command handler
///
/// Receives the fully populated command; must not retain the payload
/// beyond the call.
pub type Handler = fn(&Command) -> Result<(), HandlerError>;

#[derive(Debug, Clone, Copy)]
struct HandlerEntry {
    module: u8,
    function: u8,
    handler: Handler,
}

/// Mapping from (module id, function id) to handlers
///
/// Populated once during bring-up; the dispatch loop only reads it.
#[derive(Debug)]
pub struct HandlerTable<const N: usize> {
    entries: Vec<HandlerEntry, N>,
}

impl<const N: usize> HandlerTable<N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a handler for a (module, function) pair
    pub fn register(
        &mut self,
        module: u8,
        function: u8,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        if self.lookup(module, function).is_some() {
            return Err(RegistryError::Duplicate);
        }

        self.entries
            .push(HandlerEntry {
                module,
                function,
                handler,
            })
            .map_err(|_| RegistryError::TableFull)
    }

    /// Find the handler for a (module, function) pair
    pub fn lookup(&self, module: u8, function: u8) -> Option<Handler> {
        self.entries
            .iter()
            .find(|e| e.module == module && e.function == function)
            .map(|e| e.handler)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> Default for HandlerTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one consumer iteration that dequeued a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Handler ran successfully
    Handled { module: u8, function: u8 },
    /// No handler registered for the pair; reported, not fatal
    Unknown { module: u8, function: u8 },
    /// Handler reported a failure with its module-specific code
    HandlerFailed { module: u8, function: u8, code: u8 },
}

/// Dequeue and dispatch one command
///
/// Returns `Err(QueueError::Empty)` when there is nothing to do. On any
/// dequeued command the pool release happens exactly once before this
/// function returns, regardless of the dispatch outcome.
pub fn process_next<const C: usize, const N: usize>(
    queue: &CommandQueue<C>,
    pool: &CommandPool,
    table: &HandlerTable<N>,
) -> Result<DispatchOutcome, QueueError> {
    let mut cmd = queue.get()?;
    let module = cmd.module();
    let function = cmd.function();

    let outcome = match table.lookup(module, function) {
        Some(handler) => match handler(&cmd) {
            Ok(()) => DispatchOutcome::Handled { module, function },
            Err(HandlerError { code }) => DispatchOutcome::HandlerFailed {
                module,
                function,
                code,
            },
        },
        None => DispatchOutcome::Unknown { module, function },
    };

    // Ownership transfer is unconditional; a freshly dequeued command
    // cannot already be released, so the warning path is unreachable here
    let _ = pool.deallocate(&mut cmd);

    Ok(outcome)
}
