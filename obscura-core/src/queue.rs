//! Bounded SPSC command queue.
//!
//! One producer (the receive-interrupt decoder) calls [`CommandQueue::put`];
//! one consumer (the foreground dispatch loop) calls [`CommandQueue::get`].
//! The producer alone advances `head`, the consumer alone advances `tail`;
//! `size` and the status byte are touched by both, so each operation runs
//! its short index-plus-status update with preemption suppressed. There is
//! no lock that can block, and neither operation ever waits.
//!
//! # Status state machine
//!
//! The queue keeps an explicit status byte in {EMPTY, PARTIAL, FULL,
//! INVALID}, recomputed on every put/get. INVALID is never entered by
//! normal operation - it is the decode of a corrupted status value, and
//! anything unrecognized is treated as INVALID rather than healthy.

use core::cell::UnsafeCell;

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use crate::pool::Command;
use crate::status::QueueError;

const STATE_EMPTY: u8 = 0;
const STATE_PARTIAL: u8 = 1;
const STATE_FULL: u8 = 2;
const STATE_INVALID: u8 = 3;

/// Observable queue states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueState {
    /// No commands queued
    Empty,
    /// Between empty and full
    Partial,
    /// At capacity; the next put is refused
    Full,
    /// Status byte held an unrecognized value
    Invalid,
}

impl QueueState {
    /// Decode a raw status byte, treating anything unrecognized as INVALID
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_EMPTY => QueueState::Empty,
            STATE_PARTIAL => QueueState::Partial,
            STATE_FULL => QueueState::Full,
            _ => QueueState::Invalid,
        }
    }
}

/// A refused `put`; hands the command back so the producer can release it
#[derive(Debug)]
pub struct Rejected {
    /// Why the queue refused
    pub reason: QueueError,
    /// The command that was not enqueued
    pub cmd: Command,
}

/// Fixed-capacity SPSC ring of commands
///
/// # Safety
///
/// The slot array lives in an `UnsafeCell`, which is sound here because:
/// - The producer alone writes the slot at `head`, and only while the
///   status is not FULL (the slot is vacant)
/// - The consumer alone takes the slot at `tail`, and only while the
///   status is not EMPTY (the slot is occupied)
/// - Both updates run with preemption suppressed, so neither side ever
///   observes the other mid-update
pub struct CommandQueue<const C: usize> {
    slots: UnsafeCell<[Option<Command>; C]>,
    /// Next write slot; advanced only by the producer, wraps modulo C
    head: AtomicU32,
    /// Next read slot; advanced only by the consumer, wraps modulo C
    tail: AtomicU32,
    /// Queued command count, 0..=C
    size: AtomicU32,
    /// Stored status byte; see the state machine note above
    status: AtomicU8,
}

// SAFETY: single producer, single consumer, disjoint slot access as
// documented on the type. The critical sections in put/get prevent the
// producer interrupt from observing a half-finished consumer update.
unsafe impl<const C: usize> Sync for CommandQueue<C> {}

impl<const C: usize> CommandQueue<C> {
    /// Create an empty queue
    pub const fn new() -> Self {
        assert!(C > 0, "queue capacity must be non-zero");

        Self {
            slots: UnsafeCell::new([const { None }; C]),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            size: AtomicU32::new(0),
            status: AtomicU8::new(STATE_EMPTY),
        }
    }

    /// Enqueue a command, transferring ownership to the queue
    ///
    /// Fails when the queue is FULL or INVALID; the command comes back in
    /// the [`Rejected`] so the producer can log and release it. Never
    /// blocks and never retries.
    pub fn put(&self, cmd: Command) -> Result<(), Rejected> {
        critical_section::with(|_| {
            match self.state() {
                QueueState::Full => {
                    return Err(Rejected {
                        reason: QueueError::Full,
                        cmd,
                    });
                }
                QueueState::Invalid => {
                    return Err(Rejected {
                        reason: QueueError::Invalid,
                        cmd,
                    });
                }
                QueueState::Empty | QueueState::Partial => {}
            }

            let head = self.head.load(Ordering::Relaxed);
            // SAFETY: status was not FULL, so the head slot is vacant and
            // only this producer writes it
            unsafe {
                (*self.slots.get())[head as usize] = Some(cmd);
            }

            let head = (head + 1) % C as u32;
            self.head.store(head, Ordering::Release);

            let size = self.size.load(Ordering::Relaxed) + 1;
            self.size.store(size, Ordering::Release);

            // FULL on reaching capacity; the post-increment wrap collision
            // is kept as a second trigger for the same condition
            let full = size as usize == C || head == self.tail.load(Ordering::Acquire);
            self.status.store(
                if full { STATE_FULL } else { STATE_PARTIAL },
                Ordering::Release,
            );

            Ok(())
        })
    }

    /// Dequeue the oldest command, transferring ownership to the caller
    ///
    /// The caller is then obligated to release it through the pool exactly
    /// once. Fails with [`QueueError::Empty`] when nothing is queued.
    pub fn get(&self) -> Result<Command, QueueError> {
        critical_section::with(|_| {
            if self.state() == QueueState::Empty {
                return Err(QueueError::Empty);
            }

            let tail = self.tail.load(Ordering::Relaxed);
            // SAFETY: status was not EMPTY, so the tail slot is occupied and
            // only this consumer takes it
            let cmd = unsafe { (*self.slots.get())[tail as usize].take() };

            self.tail.store((tail + 1) % C as u32, Ordering::Release);

            let size = self.size.load(Ordering::Relaxed).saturating_sub(1);
            self.size.store(size, Ordering::Release);

            self.status.store(
                if size == 0 { STATE_EMPTY } else { STATE_PARTIAL },
                Ordering::Release,
            );

            // A vacant slot under a non-empty status means the state was
            // corrupted; never report it as a healthy dequeue
            cmd.ok_or(QueueError::Invalid)
        })
    }

    /// Current queue state
    ///
    /// An unrecognized stored value decodes to [`QueueState::Invalid`] -
    /// unknown state is never treated as healthy.
    pub fn state(&self) -> QueueState {
        QueueState::from_raw(self.status.load(Ordering::Acquire))
    }

    /// Classify the current state, mapping INVALID to an error
    pub fn check_state(&self) -> Result<QueueState, QueueError> {
        match self.state() {
            QueueState::Invalid => Err(QueueError::Invalid),
            state => Ok(state),
        }
    }

    /// Commands currently queued
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire) as usize
    }

    /// Whether the queue holds no commands
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity; no growth or shrink operation exists
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Force a raw status byte, to exercise the INVALID decode path
    #[cfg(test)]
    fn force_status(&self, raw: u8) {
        self.status.store(raw, Ordering::Release);
    }
}

impl<const C: usize> Default for CommandQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::CommandPool;
    use alloc::collections::VecDeque;
    use proptest::prelude::*;

    fn tagged(pool: &CommandPool, tag: u8) -> Command {
        pool.allocate(tag, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_queue_is_empty() {
        let queue: CommandQueue<4> = CommandQueue::new();

        assert_eq!(queue.state(), QueueState::Empty);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.get().unwrap_err(), QueueError::Empty);
    }

    #[test]
    fn test_fifo_order() {
        let pool = CommandPool::new();
        let queue: CommandQueue<8> = CommandQueue::new();

        for tag in 0..5 {
            queue.put(tagged(&pool, tag)).unwrap();
        }
        for tag in 0..5 {
            let mut cmd = queue.get().unwrap();
            assert_eq!(cmd.module(), tag);
            pool.deallocate(&mut cmd).unwrap();
        }
        assert_eq!(queue.state(), QueueState::Empty);
    }

    #[test]
    fn test_capacity_bound() {
        let pool = CommandPool::new();
        let queue: CommandQueue<4> = CommandQueue::new();

        for tag in 0..4 {
            queue.put(tagged(&pool, tag)).unwrap();
        }
        assert_eq!(queue.state(), QueueState::Full);

        let rejected = queue.put(tagged(&pool, 99)).unwrap_err();
        assert_eq!(rejected.reason, QueueError::Full);
        // The refused command comes back intact for release
        assert_eq!(rejected.cmd.module(), 99);
    }

    #[test]
    fn test_concrete_scenario_capacity_four() {
        let pool = CommandPool::new();
        let queue: CommandQueue<4> = CommandQueue::new();

        // Fill: A, B, C then PARTIAL; D makes it FULL
        for tag in [b'A', b'B', b'C'] {
            queue.put(tagged(&pool, tag)).unwrap();
            assert_eq!(queue.state(), QueueState::Partial);
        }
        queue.put(tagged(&pool, b'D')).unwrap();
        assert_eq!(queue.state(), QueueState::Full);

        // E is refused while full
        let rejected = queue.put(tagged(&pool, b'E')).unwrap_err();
        assert_eq!(rejected.reason, QueueError::Full);

        // One get frees a slot; E now fits and refills the queue
        assert_eq!(queue.get().unwrap().module(), b'A');
        assert_eq!(queue.state(), QueueState::Partial);
        queue.put(rejected.cmd).unwrap();
        assert_eq!(queue.state(), QueueState::Full);

        // Drain in order
        for tag in [b'B', b'C', b'D', b'E'] {
            assert_eq!(queue.get().unwrap().module(), tag);
        }
        assert_eq!(queue.get().unwrap_err(), QueueError::Empty);
    }

    #[test]
    fn test_wrap_correctness() {
        let pool = CommandPool::new();
        let queue: CommandQueue<4> = CommandQueue::new();

        // Interleaved put/get pairs well past capacity wrap the indices
        // without losing or duplicating entries
        for i in 0..23u32 {
            queue.put(tagged(&pool, (i % 251) as u8)).unwrap();
            assert_eq!(queue.len(), 1);
            let mut cmd = queue.get().unwrap();
            assert_eq!(cmd.module(), (i % 251) as u8);
            pool.deallocate(&mut cmd).unwrap();
            assert_eq!(queue.len(), 0);
        }
        assert_eq!(queue.state(), QueueState::Empty);
    }

    #[test]
    fn test_unrecognized_status_decodes_invalid() {
        let pool = CommandPool::new();
        let queue: CommandQueue<4> = CommandQueue::new();

        queue.force_status(0xA7);
        assert_eq!(queue.state(), QueueState::Invalid);
        assert_eq!(queue.check_state().unwrap_err(), QueueError::Invalid);

        // A put against an invalid queue is refused with the command intact
        let rejected = queue.put(tagged(&pool, 1)).unwrap_err();
        assert_eq!(rejected.reason, QueueError::Invalid);
    }

    proptest! {
        // Random put/get interleavings against a model deque: FIFO order,
        // size accounting, and the status byte all stay consistent
        #[test]
        fn prop_matches_model_deque(ops in proptest::collection::vec(any::<bool>(), 1..200)) {
            let pool = CommandPool::new();
            let queue: CommandQueue<4> = CommandQueue::new();
            let mut model: VecDeque<u8> = VecDeque::new();
            let mut seq: u8 = 0;

            for is_put in ops {
                if is_put {
                    let result = queue.put(tagged(&pool, seq));
                    if model.len() == 4 {
                        prop_assert_eq!(result.unwrap_err().reason, QueueError::Full);
                    } else {
                        prop_assert!(result.is_ok());
                        model.push_back(seq);
                    }
                    seq = seq.wrapping_add(1);
                } else {
                    match model.pop_front() {
                        Some(expected) => {
                            let mut cmd = queue.get().unwrap();
                            prop_assert_eq!(cmd.module(), expected);
                            pool.deallocate(&mut cmd).unwrap();
                        }
                        None => prop_assert_eq!(queue.get().unwrap_err(), QueueError::Empty),
                    }
                }

                prop_assert_eq!(queue.len(), model.len());
                let expected_state = match model.len() {
                    0 => QueueState::Empty,
                    4 => QueueState::Full,
                    _ => QueueState::Partial,
                };
                prop_assert_eq!(queue.state(), expected_state);
            }
        }
    }
}
