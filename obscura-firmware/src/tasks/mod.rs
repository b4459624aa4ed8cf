//! Embassy async tasks
//!
//! `cmd_rx` is the producer context, `dispatcher` the consumer context;
//! they meet only at the command queue. `log_tx` drains the log channel.

pub mod cmd_rx;
pub mod dispatcher;
pub mod log_tx;

pub use cmd_rx::cmd_rx_task;
pub use dispatcher::dispatcher_task;
pub use log_tx::log_tx_task;
