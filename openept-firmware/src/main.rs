//! OpenEPT Energy Device demo firmware
//!
//! Runs on the Cortex-M7 core of a NUCLEO-H755ZI-Q. Opens a session with
//! the acquisition device, then marks two energy points per iteration and
//! restarts the session every few iterations so both handshakes get
//! exercised.
//!
//! Wiring: USART2 TX on PD5, RX on PA3, sync line on PA5 (LD1).

#![no_std]
#![no_main]

use core::fmt::Write;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::usart::Uart;
use embassy_time::{Duration, Timer};
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use openept_core::{Link, LinkConfig};
use openept_hal_stm32::{usart_config, Stm32Serial, Stm32Transport, SyncPin};

use crate::config::{
    ITERATION_PERIOD_MS, LINK_ATTEMPTS, MARK_INTERVAL_MS, NAME_CAPACITY, READ_TIMEOUT_MS,
    RESTART_EVERY, RESTART_PAUSE_MS, START_RETRY_MS,
};

mod config;

type DemoLink = Link<Stm32Transport<'static>>;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("OpenEPT demo firmware starting...");

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let uart = match Uart::new_blocking(
        p.USART2,
        p.PA3,
        p.PD5,
        usart_config(&config::link_uart()),
    ) {
        Ok(uart) => uart,
        Err(e) => {
            error!("USART2 configuration rejected: {}", e);
            return;
        }
    };

    // Sync line idles low; the link drives it low again on init
    let sync = Output::new(p.PA5, Level::Low, Speed::Low);

    let serial = Stm32Serial::with_timeout(uart, Duration::from_millis(READ_TIMEOUT_MS));
    let transport = Stm32Transport::new(serial, SyncPin::new(sync));
    let mut link: DemoLink = Link::with_config(transport, LinkConfig::new(LINK_ATTEMPTS));

    if let Err(e) = link.init() {
        error!("Link init failed: {}", e);
        return;
    }
    info!("Link initialized ({} baud)", config::LINK_BAUDRATE);

    if let Err(e) = link.send_info("EP Link started") {
        warn!("Info message failed: {}", e);
    }

    start_session(&mut link).await;
    run_demo(&mut link).await;
}

/// Mark, wait, mark, and restart the session periodically
async fn run_demo(link: &mut DemoLink) -> ! {
    let mut iteration: u32 = 0;

    loop {
        mark(link, "DataL sending", iteration);
        Timer::after_millis(MARK_INTERVAL_MS).await;
        mark(link, "DataS sent", iteration);

        iteration = iteration.wrapping_add(1);

        if iteration % RESTART_EVERY == 0 {
            if let Err(e) = link.set_ep_slow(b"Restart") {
                warn!("Restart mark failed: {}", e);
            }
            match link.stop() {
                Ok(()) => info!("Session stopped after {} iterations", iteration),
                Err(e) => warn!("STOP failed: {}", e),
            }
            Timer::after_millis(RESTART_PAUSE_MS).await;
            start_session(link).await;
        }

        Timer::after_millis(ITERATION_PERIOD_MS).await;
    }
}

/// Send START until the acquisition device accepts it
async fn start_session(link: &mut DemoLink) {
    loop {
        match link.start() {
            Ok(()) => {
                info!("Session started");
                return;
            }
            Err(e) => {
                warn!("START failed: {}, retrying", e);
                Timer::after_millis(START_RETRY_MS).await;
            }
        }
    }
}

/// Fast-mark an energy point named `<prefix> <iteration>`
fn mark(link: &mut DemoLink, prefix: &str, iteration: u32) {
    let mut name: String<NAME_CAPACITY> = String::new();
    if core::write!(name, "{} {}", prefix, iteration).is_err() {
        warn!("Energy point name truncated");
    }

    if let Err(e) = link.set_ep_fast(name.as_bytes()) {
        warn!("Mark '{}' failed: {}", name.as_str(), e);
    }
}
