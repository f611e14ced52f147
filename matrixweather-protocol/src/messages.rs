//! Message types for the panel and network links
//!
//! Type IDs are grouped by link and direction:
//! - 0x40..0x4F: controller → panel
//! - 0x50..0x5F: panel → controller
//! - 0x60..0x6F: controller → network co-processor
//! - 0x70..0x7F: network co-processor → controller

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use heapless::Vec;

// Message type IDs: controller → panel
pub const MSG_BLANK: u8 = 0x40;
pub const MSG_BRIGHTNESS: u8 = 0x41;
pub const MSG_LABEL: u8 = 0x42;
pub const MSG_ICON: u8 = 0x43;
pub const MSG_CLEAR_ICON: u8 = 0x44;
pub const MSG_PRESENT: u8 = 0x45;
pub const MSG_SPLASH: u8 = 0x46;

// Message type IDs: panel → controller
pub const MSG_ACK: u8 = 0x50;
pub const MSG_NACK: u8 = 0x51;

// Message type IDs: controller → network co-processor
pub const MSG_JOIN: u8 = 0x60;
pub const MSG_HTTP_GET: u8 = 0x61;
pub const MSG_TIME_REQUEST: u8 = 0x62;

// Message type IDs: network co-processor → controller
pub const MSG_JOINED: u8 = 0x70;
pub const MSG_BODY: u8 = 0x71;
pub const MSG_BODY_END: u8 = 0x72;
pub const MSG_TIME: u8 = 0x73;
pub const MSG_FAILED: u8 = 0x74;

/// Longest label text the panel accepts
pub const MAX_LABEL_TEXT: usize = 48;

/// Commands from the controller to the matrix panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelCommand<'a> {
    /// Re-initialise the framebuffer at the given bit depth and clear it;
    /// the backlight level is kept
    Blank { bit_depth: u8 },
    /// Panel brightness (0 = off, 255 = full)
    Brightness { level: u8 },
    /// Place a text label; `x`/`y` are the label's anchor in panel pixels
    Label {
        slot: u8,
        x: i16,
        y: i16,
        color: u32,
        text: &'a str,
    },
    /// Show a sprite from the icon sheet at `x`/`y` (top-left), palette
    /// scaled by `level`
    Icon { sprite: u8, x: i16, y: i16, level: u8 },
    /// Remove the icon
    ClearIcon,
    /// Show the stored splash image instead of the layout, palette scaled
    /// by `level`
    Splash { level: u8 },
    /// Swap the back buffer onto the panel
    Present,
}

impl PanelCommand<'_> {
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            PanelCommand::Blank { bit_depth } => Frame::new(MSG_BLANK, &[*bit_depth]),
            PanelCommand::Brightness { level } => Frame::new(MSG_BRIGHTNESS, &[*level]),
            PanelCommand::Label {
                slot,
                x,
                y,
                color,
                text,
            } => {
                // Payload: [slot][x:i16][y:i16][r][g][b][len][text...]
                let text = truncate_utf8(text, MAX_LABEL_TEXT);
                let rgb = color.to_be_bytes();

                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                push_all(&mut payload, &[*slot])?;
                push_all(&mut payload, &x.to_le_bytes())?;
                push_all(&mut payload, &y.to_le_bytes())?;
                push_all(&mut payload, &rgb[1..])?;
                push_all(&mut payload, &[text.len() as u8])?;
                push_all(&mut payload, text.as_bytes())?;

                Frame::new(MSG_LABEL, &payload)
            }
            PanelCommand::Icon {
                sprite,
                x,
                y,
                level,
            } => {
                // Payload: [sprite][level][x:i16][y:i16]
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                push_all(&mut payload, &[*sprite, *level])?;
                push_all(&mut payload, &x.to_le_bytes())?;
                push_all(&mut payload, &y.to_le_bytes())?;
                Frame::new(MSG_ICON, &payload)
            }
            PanelCommand::ClearIcon => Ok(Frame::empty(MSG_CLEAR_ICON)),
            PanelCommand::Splash { level } => Frame::new(MSG_SPLASH, &[*level]),
            PanelCommand::Present => Ok(Frame::empty(MSG_PRESENT)),
        }
    }
}

/// Replies from the matrix panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelReply {
    Ack,
    Nack { code: u8 },
}

impl PanelReply {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_ACK => Ok(PanelReply::Ack),
            MSG_NACK => {
                let code = *frame.payload.first().ok_or(FrameError::Malformed)?;
                Ok(PanelReply::Nack { code })
            }
            other => Err(FrameError::UnknownType(other)),
        }
    }
}

/// Commands from the controller to the network co-processor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetCommand<'a> {
    /// Join the access point
    Join { ssid: &'a str, password: &'a str },
    /// Perform an HTTP GET and stream the body back
    HttpGet { url: &'a str },
    /// Request the current UTC time (NTP on the co-processor)
    TimeRequest,
}

impl NetCommand<'_> {
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            NetCommand::Join { ssid, password } => {
                // Payload: [ssid_len][ssid...][pw_len][pw...]
                if ssid.len() > u8::MAX as usize || password.len() > u8::MAX as usize {
                    return Err(FrameError::PayloadTooLarge);
                }
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                push_all(&mut payload, &[ssid.len() as u8])?;
                push_all(&mut payload, ssid.as_bytes())?;
                push_all(&mut payload, &[password.len() as u8])?;
                push_all(&mut payload, password.as_bytes())?;
                Frame::new(MSG_JOIN, &payload)
            }
            NetCommand::HttpGet { url } => Frame::new(MSG_HTTP_GET, url.as_bytes()),
            NetCommand::TimeRequest => Ok(Frame::empty(MSG_TIME_REQUEST)),
        }
    }
}

/// Replies from the network co-processor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetReply<'a> {
    /// Access point joined
    Joined,
    /// One ordered chunk of an HTTP response body
    Body { seq: u16, data: &'a [u8] },
    /// Response complete
    BodyEnd { status: u16 },
    /// Seconds since the Unix epoch
    Time { unix: u64 },
    /// The request could not be completed
    Failed { code: u8 },
}

impl<'a> NetReply<'a> {
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let payload = frame.payload.as_slice();
        match frame.msg_type {
            MSG_JOINED => Ok(NetReply::Joined),
            MSG_BODY => {
                let (seq, data) = payload.split_first_chunk::<2>().ok_or(FrameError::Malformed)?;
                Ok(NetReply::Body {
                    seq: u16::from_le_bytes(*seq),
                    data,
                })
            }
            MSG_BODY_END => {
                let status = payload.first_chunk::<2>().ok_or(FrameError::Malformed)?;
                Ok(NetReply::BodyEnd {
                    status: u16::from_le_bytes(*status),
                })
            }
            MSG_TIME => {
                let unix = payload.first_chunk::<8>().ok_or(FrameError::Malformed)?;
                Ok(NetReply::Time {
                    unix: u64::from_le_bytes(*unix),
                })
            }
            MSG_FAILED => {
                let code = *payload.first().ok_or(FrameError::Malformed)?;
                Ok(NetReply::Failed { code })
            }
            other => Err(FrameError::UnknownType(other)),
        }
    }
}

fn push_all(payload: &mut Vec<u8, MAX_PAYLOAD_SIZE>, bytes: &[u8]) -> Result<(), FrameError> {
    payload
        .extend_from_slice(bytes)
        .map_err(|_| FrameError::PayloadTooLarge)
}

/// Truncate to at most `max` bytes without splitting a character
fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_payload_layout() {
        let cmd = PanelCommand::Label {
            slot: 1,
            x: -12,
            y: 55,
            color: 0x0066FF,
            text: "Rain",
        };
        let frame = cmd.to_frame().unwrap();

        assert_eq!(frame.msg_type, MSG_LABEL);
        assert_eq!(frame.payload[0], 1);
        assert_eq!(i16::from_le_bytes([frame.payload[1], frame.payload[2]]), -12);
        assert_eq!(i16::from_le_bytes([frame.payload[3], frame.payload[4]]), 55);
        assert_eq!(&frame.payload[5..8], &[0x00, 0x66, 0xFF]);
        assert_eq!(frame.payload[8], 4);
        assert_eq!(&frame.payload[9..], b"Rain");
    }

    #[test]
    fn test_label_text_truncates_on_char_boundary() {
        // 47 ASCII bytes followed by a two-byte degree sign
        let mut text: heapless::String<64> = heapless::String::new();
        for _ in 0..47 {
            text.push('x').unwrap();
        }
        text.push('°').unwrap();

        let frame = PanelCommand::Label {
            slot: 0,
            x: 0,
            y: 0,
            color: 0,
            text: &text,
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.payload[8], 47);
    }

    #[test]
    fn test_icon_payload_carries_position() {
        let frame = PanelCommand::Icon {
            sprite: 11,
            x: 8,
            y: -3,
            level: 26,
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.msg_type, MSG_ICON);
        assert_eq!(&frame.payload[..2], &[11, 26]);
        assert_eq!(i16::from_le_bytes([frame.payload[2], frame.payload[3]]), 8);
        assert_eq!(i16::from_le_bytes([frame.payload[4], frame.payload[5]]), -3);
        assert_eq!(frame.payload.len(), 6);
    }

    #[test]
    fn test_splash_payload() {
        let frame = PanelCommand::Splash { level: 57 }.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_SPLASH);
        assert_eq!(frame.payload.as_slice(), &[57]);
    }

    #[test]
    fn test_join_payload_layout() {
        let frame = NetCommand::Join {
            ssid: "attic",
            password: "pw",
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.msg_type, MSG_JOIN);
        assert_eq!(frame.payload.as_slice(), b"\x05attic\x02pw");
    }

    #[test]
    fn test_body_reply_decodes_sequence() {
        let frame = Frame::new(MSG_BODY, &[0x02, 0x00, b'{', b'}']).unwrap();
        assert_eq!(
            NetReply::from_frame(&frame).unwrap(),
            NetReply::Body {
                seq: 2,
                data: b"{}"
            }
        );
    }

    #[test]
    fn test_short_payloads_are_malformed() {
        let frame = Frame::new(MSG_TIME, &[1, 2, 3]).unwrap();
        assert_eq!(NetReply::from_frame(&frame), Err(FrameError::Malformed));

        let frame = Frame::empty(MSG_NACK);
        assert_eq!(PanelReply::from_frame(&frame), Err(FrameError::Malformed));
    }

    #[test]
    fn test_unknown_reply_type() {
        let frame = Frame::empty(MSG_PRESENT);
        assert_eq!(
            PanelReply::from_frame(&frame),
            Err(FrameError::UnknownType(MSG_PRESENT))
        );
    }
}
