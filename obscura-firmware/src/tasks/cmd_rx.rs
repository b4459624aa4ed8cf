//! Command UART receive task
//!
//! The producer side of the command path: feeds received bytes to the
//! frame decoder and enqueues completed commands. A refused put is a
//! logged drop - no retry, no backpressure to the host.

use defmt::*;
use embassy_stm32::usart::BufferedUartRx;
use embedded_io_async::Read;

use obscura_core::status::Module;
use obscura_core::{Command, FrameDecoder, Rejected};

use crate::channels::{log_report, LogRecord, CMD_POOL, CMD_QUEUE};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Command RX task - decodes frames from the host link
#[embassy_executor::task]
pub async fn cmd_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Command RX task started");

    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match decoder.feed(&CMD_POOL, byte) {
                        Ok(Some(cmd)) => enqueue(cmd),
                        Ok(None) => {
                            // Frame still accumulating
                        }
                        Err(e) => {
                            // In-flight frame abandoned; remaining payload
                            // bytes will be misread as a new frame
                            warn!("Command allocation failed: {:?}", e);
                            log_report(LogRecord::message(
                                Module::Cmd,
                                e.wire_code(),
                                "could not allocate command, frame dropped",
                            ));
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Hand a completed command to the queue, releasing it on refusal
fn enqueue(cmd: Command) {
    trace!(
        "Command complete: module={=u8:#x} func={=u8:#x} len={=u16}",
        cmd.module(),
        cmd.function(),
        cmd.data_len()
    );

    if let Err(Rejected { reason, mut cmd }) = CMD_QUEUE.put(cmd) {
        warn!("Queue refused command: {:?}", reason);
        log_report(LogRecord::message(
            Module::Cmd,
            reason.wire_code(),
            "could not enqueue command, frame dropped",
        ));
        let _ = CMD_POOL.deallocate(&mut cmd);
    }
}
