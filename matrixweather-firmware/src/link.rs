//! Framed request/reply over a UART
//!
//! Both peers (matrix panel and network co-processor) answer every
//! command, so a link is a blocking send followed by a bounded wait for
//! the next complete frame.

use defmt::*;
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};
use matrixweather_core::traits::FetchError;
use matrixweather_protocol::{Frame, FrameError, FrameParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum LinkError {
    /// UART read or write failed
    Io,
    /// Outgoing frame could not be encoded
    Frame(FrameError),
    /// No complete frame before the deadline
    Timeout,
}

impl From<LinkError> for FetchError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::Timeout => FetchError::Timeout,
            LinkError::Io | LinkError::Frame(_) => FetchError::Network,
        }
    }
}

pub struct FrameLink<U> {
    uart: U,
    parser: FrameParser,
    timeout: Duration,
}

impl<U> FrameLink<U>
where
    U: Read + Write + ReadReady,
{
    pub fn new(uart: U, timeout_ms: u64) -> Self {
        Self {
            uart,
            parser: FrameParser::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn send(&mut self, frame: &Frame) -> Result<(), LinkError> {
        let bytes = frame.encode_to_vec().map_err(LinkError::Frame)?;
        self.uart.write_all(&bytes).map_err(|_| LinkError::Io)?;
        self.uart.flush().map_err(|_| LinkError::Io)
    }

    /// Wait for the next complete frame
    ///
    /// Reads one byte at a time so nothing past the frame end is consumed.
    /// Corrupt frames are logged and skipped.
    pub fn receive(&mut self) -> Result<Frame, LinkError> {
        let deadline = Instant::now() + self.timeout;
        let mut byte = [0u8; 1];

        loop {
            if !self.uart.read_ready().map_err(|_| LinkError::Io)? {
                if Instant::now() >= deadline {
                    self.parser.reset();
                    return Err(LinkError::Timeout);
                }
                continue;
            }

            if self.uart.read(&mut byte).map_err(|_| LinkError::Io)? == 0 {
                continue;
            }
            match self.parser.feed(byte[0]) {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {}
                Err(e) => warn!("link: dropped frame: {:?}", e),
            }
        }
    }

    /// Discard anything already buffered from the peer
    pub fn drain(&mut self) -> Result<(), LinkError> {
        let mut buf = [0u8; 32];
        while self.uart.read_ready().map_err(|_| LinkError::Io)? {
            self.uart.read(&mut buf).map_err(|_| LinkError::Io)?;
        }
        self.parser.reset();
        Ok(())
    }

    pub fn request(&mut self, frame: &Frame) -> Result<Frame, LinkError> {
        self.drain()?;
        self.send(frame)?;
        self.receive()
    }
}
