//! MatrixWeather Serial Link Protocol
//!
//! The controller talks to two peers over UART:
//!
//! - the **matrix panel**, which owns the HUB75 refresh, the font and the
//!   icon sprite sheet and only draws what it is told to draw;
//! - the **network co-processor**, which owns Wi-Fi, DNS, HTTP and NTP and
//!   streams response bodies back in chunks.
//!
//! Both links share one binary frame format:
//! ```text
//! ┌───────┬──────┬────────────┬─────────────┬────────┐
//! │ START │ TYPE │ LENGTH     │ PAYLOAD     │ CRC-8  │
//! │ 1B    │ 1B   │ 2B (LE)    │ 0–512B      │ 1B     │
//! └───────┴──────┴────────────┴─────────────┴────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{crc8, Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
pub use messages::{NetCommand, NetReply, PanelCommand, PanelReply};
