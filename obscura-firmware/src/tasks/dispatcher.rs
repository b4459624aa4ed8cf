//! Command dispatch task
//!
//! The foreground consumer: drains the queue, dispatches by (module,
//! function), and releases every dequeued command exactly once.

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::{Duration, Ticker};

use obscura_core::status::{Module, QueueError, STATUS_UNKNOWN_COMMAND};
use obscura_core::{process_next, DispatchOutcome, HandlerTable};

use crate::channels::{log_report, LogRecord, CMD_POOL, CMD_QUEUE, HANDLER_TABLE_CAP};

/// Poll interval while the queue is empty
const IDLE_POLL: Duration = Duration::from_millis(2);

/// Dispatcher task - the consumer side of the command path
#[embassy_executor::task]
pub async fn dispatcher_task(table: &'static HandlerTable<HANDLER_TABLE_CAP>) {
    info!("Dispatcher task started");

    let mut ticker = Ticker::every(IDLE_POLL);

    loop {
        match process_next(&CMD_QUEUE, &CMD_POOL, table) {
            Ok(DispatchOutcome::Handled { module, function }) => {
                trace!("Handled {=u8:#x}/{=u8:#x}", module, function);
                yield_now().await;
            }
            Ok(DispatchOutcome::Unknown { module, function }) => {
                // Reported, not fatal
                warn!("No handler for {=u8:#x}/{=u8:#x}", module, function);
                log_report(LogRecord::message(
                    Module::Cmd,
                    STATUS_UNKNOWN_COMMAND,
                    "unknown command",
                ));
                yield_now().await;
            }
            Ok(DispatchOutcome::HandlerFailed {
                module,
                function,
                code,
            }) => {
                warn!(
                    "Handler {=u8:#x}/{=u8:#x} failed with code {=u8}",
                    module, function, code
                );
                log_report(LogRecord::status_only(Module::Cmd, code));
                yield_now().await;
            }
            Err(QueueError::Empty) => {
                ticker.next().await;
            }
            Err(e) => {
                error!("Queue fault: {:?}", e);
                log_report(LogRecord::message(
                    Module::Cmd,
                    e.wire_code(),
                    "queue fault on get",
                ));
                ticker.next().await;
            }
        }
    }
}
