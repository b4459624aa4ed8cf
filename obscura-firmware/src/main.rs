//! Obscura - Camera Controller Command Firmware
//!
//! Main firmware binary for STM32F429-based camera controller boards.
//! Reconstructs variable-length binary commands from the host serial link
//! and dispatches them to registered module handlers.
//!
//! Named after the camera obscura - the darkened chamber that turns a
//! pinhole of light into an image, much as this firmware turns a serial
//! trickle of bytes into structured commands.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::peripherals::{USART1, USART2};
use embassy_stm32::usart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use obscura_core::HandlerTable;

use crate::channels::{CMD_POOL, CMD_QUEUE, HANDLER_TABLE_CAP};

mod channels;
mod handlers;
mod tasks;

// Heap allocator for command payload buffers
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 64KB. A frame whose payload cannot be satisfied from here is
// refused at the pool and dropped.
const HEAP_SIZE: usize = 64 * 1024;

bind_interrupts!(struct Irqs {
    USART1 => BufferedInterruptHandler<USART1>;
    USART2 => BufferedInterruptHandler<USART2>;
});

// Static cells for UART buffers (must live forever)
static CMD_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static CMD_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static LOG_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static LOG_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Handler table: populated once here, read-only for the dispatcher
static HANDLER_TABLE: StaticCell<HandlerTable<HANDLER_TABLE_CAP>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Obscura firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize STM32F429 peripherals
    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let uart_config = UartConfig::default(); // 115200 baud default

    // Command link: host -> controller on USART2 (PD6 RX / PD5 TX)
    let cmd_uart = BufferedUart::new(
        p.USART2,
        Irqs,
        p.PD6,
        p.PD5,
        CMD_TX_BUF.init([0u8; 256]),
        CMD_RX_BUF.init([0u8; 256]),
        uart_config,
    )
    .unwrap();
    let (_cmd_tx, cmd_rx) = cmd_uart.split();

    // Log link: controller -> host terminal on USART1 (PA9 TX / PA10 RX)
    let log_uart = BufferedUart::new(
        p.USART1,
        Irqs,
        p.PA10,
        p.PA9,
        LOG_TX_BUF.init([0u8; 256]),
        LOG_RX_BUF.init([0u8; 64]),
        uart_config,
    )
    .unwrap();
    let (log_tx, _log_rx) = log_uart.split();

    info!("UARTs initialized for command and log links");

    // Populate the dispatch table before the consumer starts; a failure
    // here means the table constants are wrong, which halts bring-up
    let table = HANDLER_TABLE.init(HandlerTable::new());
    handlers::register_all(table).unwrap();
    let table = &*table;
    info!("{} handlers registered", table.len());

    // Spawn tasks
    spawner.spawn(tasks::cmd_rx_task(cmd_rx)).unwrap();
    spawner.spawn(tasks::dispatcher_task(table)).unwrap();
    spawner.spawn(tasks::log_tx_task(log_tx)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!(
            "Heartbeat: queue={=usize} live={=usize} high-water={=usize}",
            CMD_QUEUE.len(),
            CMD_POOL.live(),
            CMD_POOL.high_water()
        );
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
