//! Log UART transmit task
//!
//! Drains the log channel, encodes records as host log packets, and
//! writes them to the debug link.

use defmt::*;
use embassy_stm32::usart::BufferedUartTx;
use embedded_io_async::Write;

use obscura_protocol::log_packet::LogPacket;

use crate::channels::LOG_CHANNEL;

/// Log TX task - forwards records to the host terminal
#[embassy_executor::task]
pub async fn log_tx_task(mut tx: BufferedUartTx<'static>) {
    info!("Log TX task started");

    loop {
        let record = LOG_CHANNEL.receive().await;

        let packet = LogPacket {
            module: record.module.id(),
            status: record.status,
            message: record.message,
            data: &record.data,
        };

        match packet.encode_to_vec() {
            Ok(encoded) => {
                if let Err(e) = tx.write_all(&encoded).await {
                    warn!("Failed to send log packet: {:?}", e);
                }
            }
            Err(e) => {
                warn!("Log packet encode failed: {:?}", e);
            }
        }
    }
}
