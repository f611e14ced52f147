//! Frame encoding and decoding for the serial links.
//!
//! Frame format:
//! - START (1 byte): 0xA5 synchronization byte
//! - TYPE (1 byte): message type identifier
//! - LENGTH (2 bytes, little-endian): payload length (0-512)
//! - PAYLOAD (0-512 bytes): type-specific data
//! - CRC (1 byte): CRC-8 (poly 0x07, init 0x00) over TYPE, LENGTH and PAYLOAD

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xA5;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Bytes of framing around the payload (START + TYPE + LENGTH + CRC)
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// CRC mismatch
    InvalidCrc,
    /// Length field out of range
    InvalidLength,
    /// Payload does not match the layout of its message type
    Malformed,
    /// Message type not known on this link
    UnknownType(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// CRC-8 with polynomial 0x07 (SMBus), MSB first, no reflection
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| crc8_update(crc, byte))
}

fn crc8_update(mut crc: u8, byte: u8) -> u8 {
    crc ^= byte;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ 0x07
        } else {
            crc << 1
        };
    }
    crc
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    fn header(&self) -> [u8; 3] {
        let len = (self.payload.len() as u16).to_le_bytes();
        [self.msg_type, len[0], len[1]]
    }

    fn crc(&self) -> u8 {
        let crc = self
            .header()
            .iter()
            .fold(0u8, |crc, &byte| crc8_update(crc, byte));
        self.payload
            .iter()
            .fold(crc, |crc, &byte| crc8_update(crc, byte))
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = FRAME_OVERHEAD + self.payload.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_START;
        buffer[1..4].copy_from_slice(&self.header());
        buffer[4..4 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = self.crc();

        Ok(frame_len)
    }

    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Incremental frame decoder
///
/// Bytes are fed one at a time as they arrive from the UART. Garbage before
/// a START byte is skipped, so the parser resynchronises after line noise or
/// a peer reset.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    msg_type: u8,
    expected_len: u16,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    Type,
    LengthLow,
    LengthHigh,
    Payload,
    Crc,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Start,
            msg_type: 0,
            expected_len: 0,
            buffer: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state = ParseState::Start;
        self.msg_type = 0;
        self.expected_len = 0;
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` once a complete, CRC-valid frame has been
    /// received, `Ok(None)` while more bytes are needed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::Start => {
                if byte == FRAME_START {
                    self.state = ParseState::Type;
                }
                Ok(None)
            }
            ParseState::Type => {
                self.msg_type = byte;
                self.state = ParseState::LengthLow;
                Ok(None)
            }
            ParseState::LengthLow => {
                self.expected_len = byte as u16;
                self.state = ParseState::LengthHigh;
                Ok(None)
            }
            ParseState::LengthHigh => {
                self.expected_len |= (byte as u16) << 8;
                if self.expected_len as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                self.buffer.clear();
                self.state = if self.expected_len == 0 {
                    ParseState::Crc
                } else {
                    ParseState::Payload
                };
                Ok(None)
            }
            ParseState::Payload => {
                // Length was bounded above, push cannot overflow
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.expected_len as usize {
                    self.state = ParseState::Crc;
                }
                Ok(None)
            }
            ParseState::Crc => {
                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: self.buffer.clone(),
                };
                self.reset();

                if byte != frame.crc() {
                    return Err(FrameError::InvalidCrc);
                }
                Ok(Some(frame))
            }
        }
    }

    /// Feed bytes until the first complete frame
    ///
    /// Bytes after that frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
