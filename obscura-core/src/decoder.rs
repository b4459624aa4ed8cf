//! Byte-at-a-time frame decoder for the inbound command link.
//!
//! Runs once per received byte in the receive-interrupt context. At most
//! one frame is ever in flight; the decoder trusts its byte counter and
//! has no resynchronization strategy - a byte lost mid-frame poisons the
//! framing until the link is reset.

use obscura_protocol::frame::HEADER_LEN;

use crate::pool::{Command, CommandPool};
use crate::status::PoolError;

/// Accumulates one command frame, byte by byte
///
/// Layout on the wire: module id, function id, length low byte, length
/// high byte, then `length` payload bytes. The working command is
/// pool-allocated as soon as the length is known and handed out once the
/// byte counter reaches the total frame size.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes consumed of the current frame
    ctr: u32,
    /// Total frame size; header-only until the length bytes arrive
    total: u32,
    /// Length accumulator: byte 2 added unshifted, byte 3 added shifted
    /// left 8
    data_len: u16,
    module: u8,
    function: u8,
    /// The in-flight command, present from the length byte to completion
    working: Option<Command>,
}

impl FrameDecoder {
    /// Create a decoder ready for the first byte of a frame
    pub const fn new() -> Self {
        Self {
            ctr: 0,
            total: HEADER_LEN as u32,
            data_len: 0,
            module: 0,
            function: 0,
            working: None,
        }
    }

    /// Return all working state to the initial configuration
    pub fn reset(&mut self) {
        self.ctr = 0;
        self.total = HEADER_LEN as u32;
        self.data_len = 0;
        self.module = 0;
        self.function = 0;
        self.working = None;
    }

    /// Feed a single received byte
    ///
    /// Returns `Ok(Some(command))` when this byte completes a frame,
    /// `Ok(None)` while the frame is still accumulating. An allocation
    /// failure abandons the in-flight frame: the decoder resets and the
    /// remaining payload bytes will be misread as a new frame - accepted
    /// behavior, there is no recovery path for a broken frame.
    pub fn feed(&mut self, pool: &CommandPool, byte: u8) -> Result<Option<Command>, PoolError> {
        match self.ctr {
            0 => self.module = byte,
            1 => self.function = byte,
            2 => self.data_len += byte as u16,
            3 => {
                self.data_len += (byte as u16) << 8;
                if self.data_len != 0 {
                    self.total += self.data_len as u32;
                }
                match pool.allocate(self.module, self.function, self.data_len) {
                    Ok(cmd) => self.working = Some(cmd),
                    Err(e) => {
                        self.reset();
                        return Err(e);
                    }
                }
            }
            n => {
                if let Some(cmd) = self.working.as_mut() {
                    cmd.data_mut()[(n - HEADER_LEN as u32) as usize] = byte;
                }
            }
        }

        self.ctr += 1;
        if self.ctr >= self.total {
            let cmd = self.working.take();
            self.reset();
            return Ok(cmd);
        }

        Ok(None)
    }

    /// Feed a byte slice, returning the first completed command
    ///
    /// Bytes after a completed frame are not consumed. Mostly useful in
    /// tests and simulation; the interrupt path feeds single bytes.
    pub fn feed_bytes(
        &mut self,
        pool: &CommandPool,
        bytes: &[u8],
    ) -> Result<Option<Command>, PoolError> {
        for &byte in bytes {
            if let Some(cmd) = self.feed(pool, byte)? {
                return Ok(Some(cmd));
            }
        }
        Ok(None)
    }

    /// Whether the decoder is mid-frame
    pub fn in_flight(&self) -> bool {
        self.ctr != 0
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
