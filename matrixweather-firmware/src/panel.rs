//! Matrix panel over the panel link
//!
//! The panel owns HUB75 refresh, the font, the icon sheet and the splash
//! image. Each presented frame is sent as one command per label, the
//! icon, then `Present` (or just `Splash` and `Present` while the splash
//! is up), and every command must be acknowledged.

use defmt::*;
use embedded_io::{Read, ReadReady, Write};
use matrixweather_display::{DisplayError, Frame, LabelSlot, MatrixBackend};
use matrixweather_protocol::{PanelCommand, PanelReply};

use crate::link::FrameLink;

pub struct PanelLink<U> {
    link: FrameLink<U>,
    brightness: f32,
}

impl<U> PanelLink<U>
where
    U: Read + Write + ReadReady,
{
    pub fn new(link: FrameLink<U>) -> Self {
        Self {
            link,
            brightness: 0.0,
        }
    }

    fn command(&mut self, command: PanelCommand<'_>) -> Result<(), DisplayError> {
        let frame = command
            .to_frame()
            .map_err(|_| DisplayError::BufferOverflow)?;
        let reply = self.link.request(&frame).map_err(|e| {
            warn!("panel: {:?}", e);
            DisplayError::Communication
        })?;

        match PanelReply::from_frame(&reply) {
            Ok(PanelReply::Ack) => Ok(()),
            Ok(PanelReply::Nack { code }) => Err(DisplayError::Rejected(code)),
            Err(_) => Err(DisplayError::Communication),
        }
    }
}

impl<U> MatrixBackend for PanelLink<U>
where
    U: Read + Write + ReadReady,
{
    fn blank(&mut self, bit_depth: u8) -> Result<(), DisplayError> {
        self.command(PanelCommand::Blank { bit_depth })
    }

    fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        let level = level.clamp(0.0, 1.0);
        self.command(PanelCommand::Brightness {
            level: (level * 255.0 + 0.5) as u8,
        })?;
        self.brightness = level;
        Ok(())
    }

    fn brightness(&self) -> f32 {
        self.brightness
    }

    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if let Some(level) = frame.splash {
            self.command(PanelCommand::Splash { level })?;
            return self.command(PanelCommand::Present);
        }

        for slot in LabelSlot::ALL {
            let label = frame.label(slot);
            self.command(PanelCommand::Label {
                slot: slot.index() as u8,
                x: label.x,
                y: label.y,
                color: label.color,
                text: &label.text,
            })?;
        }

        match &frame.icon {
            Some(icon) => self.command(PanelCommand::Icon {
                sprite: icon.sprite,
                x: icon.x,
                y: icon.y,
                level: icon.level,
            })?,
            None => self.command(PanelCommand::ClearIcon)?,
        }

        self.command(PanelCommand::Present)
    }
}
