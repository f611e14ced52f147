//! MatrixWeather - LED Matrix Weather Display Firmware
//!
//! Main firmware binary for RP2040 controllers driving a 64x32 RGB matrix
//! through a panel controller and reaching the network through a Wi-Fi
//! co-processor, both over UART.
//!
//! The application runs as a single blocking loop under the failover
//! supervisor: any failure blanks the panel and blinks the status LED
//! until the configured recovery (hold, or hardware reset) takes over.

#![no_std]
#![no_main]

extern crate alloc;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use matrixweather_core::app::PrimaryLoop;
use matrixweather_core::config::parse_settings;
use matrixweather_core::supervisor::supervise;
use matrixweather_core::DeviceContext;
use matrixweather_drivers::{GpioButton, GpioIndicator};
use matrixweather_hal_rp2040::{RpInput, RpOutput, ScbReset};

use crate::clock::MonotonicClock;
use crate::link::FrameLink;
use crate::network::{NetworkLink, SharedNetwork};
use crate::panel::PanelLink;

mod clock;
mod link;
mod network;
mod panel;

// Heap allocator for JSON documents
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 48KB (response body plus the parsed document)
const HEAP_SIZE: usize = 48 * 1024;

/// Settings document embedded at build time (validated by build.rs)
const SETTINGS: &str = include_str!(concat!(env!("OUT_DIR"), "/weather.toml"));

/// Panel commands are acknowledged as soon as they are applied
const PANEL_TIMEOUT_MS: u64 = 250;

/// Long enough for a join, an HTTP round trip or an NTP query
const NETWORK_TIMEOUT_MS: u64 = 15_000;

const PANEL_BAUD: u32 = 115_200;
const NETWORK_BAUD: u32 = 460_800;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static PANEL_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static PANEL_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static NET_TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static NET_RX_BUF: StaticCell<[u8; 2048]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("MatrixWeather firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let settings = parse_settings(SETTINGS);
    if let Err(e) = &settings.secrets {
        warn!("Settings: {}", e.message());
    }
    let supervisor = settings.supervisor;
    let credentials = settings.secrets.as_ref().ok().cloned();

    // Panel controller on UART0 (GPIO0 TX, GPIO1 RX)
    let mut panel_config = UartConfig::default();
    panel_config.baudrate = PANEL_BAUD;
    let panel_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, panel_config).into_buffered::<UART0>(
        Irqs,
        PANEL_TX_BUF.init([0u8; 256]),
        PANEL_RX_BUF.init([0u8; 64]),
    );
    let display = PanelLink::new(FrameLink::new(panel_uart, PANEL_TIMEOUT_MS));

    // Network co-processor on UART1 (GPIO4 TX, GPIO5 RX)
    let mut net_config = UartConfig::default();
    net_config.baudrate = NETWORK_BAUD;
    let net_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, net_config).into_buffered::<UART1>(
        Irqs,
        NET_TX_BUF.init([0u8; 512]),
        NET_RX_BUF.init([0u8; 2048]),
    );
    let network = RefCell::new(NetworkLink::new(
        FrameLink::new(net_uart, NETWORK_TIMEOUT_MS),
        credentials,
    ));
    info!("UART links initialized");

    // Status LED on GPIO25, buttons to ground on GPIO2 (up) / GPIO3 (down)
    let indicator = GpioIndicator::new_active_high(RpOutput::new(Output::new(p.PIN_25, Level::Low)));
    let up = GpioButton::active_low(RpInput::new(Input::new(p.PIN_2, Pull::Up)));
    let down = GpioButton::active_low(RpInput::new(Input::new(p.PIN_3, Pull::Up)));

    let mut device = DeviceContext::new(display, indicator, up, down, MonotonicClock);
    let mut primary = PrimaryLoop::new(
        settings,
        SharedNetwork::new(&network),
        SharedNetwork::new(&network),
    );

    info!("Starting supervised primary loop");
    match supervise(&mut device, &mut primary, &mut Delay, &mut ScbReset, supervisor) {
        Ok(never) => match never {},
        Err(e) => defmt::panic!("unhandled failure: {}", e),
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
