//! Network co-processor client
//!
//! The co-processor owns Wi-Fi, DNS, HTTP and NTP. The access point is
//! joined lazily on the first request and again after any request the
//! co-processor reports as failed.

use alloc::vec::Vec;
use core::cell::RefCell;

use defmt::*;
use embedded_io::{Read, ReadReady, Write};
use matrixweather_core::config::Secrets;
use matrixweather_core::traits::{FetchError, TimeSource, WeatherSource};
use matrixweather_protocol::{NetCommand, NetReply};
use serde_json::Value;

use crate::link::FrameLink;

/// Largest response body accepted
pub const MAX_BODY_SIZE: usize = 8 * 1024;

/// HTTP status of a usable response
const HTTP_OK: u16 = 200;

pub struct NetworkLink<U> {
    link: FrameLink<U>,
    credentials: Option<Secrets>,
    joined: bool,
}

impl<U> NetworkLink<U>
where
    U: Read + Write + ReadReady,
{
    /// Without credentials every request fails with `FetchError::Network`
    pub fn new(link: FrameLink<U>, credentials: Option<Secrets>) -> Self {
        Self {
            link,
            credentials,
            joined: false,
        }
    }

    fn join(&mut self) -> Result<(), FetchError> {
        if self.joined {
            return Ok(());
        }
        let Some(secrets) = &self.credentials else {
            return Err(FetchError::Network);
        };

        info!("Connecting to {}", secrets.ssid.as_str());
        let frame = NetCommand::Join {
            ssid: &secrets.ssid,
            password: &secrets.password,
        }
        .to_frame()
        .map_err(|_| FetchError::Network)?;

        let reply = self.link.request(&frame)?;
        match NetReply::from_frame(&reply) {
            Ok(NetReply::Joined) => {
                info!("Connected");
                self.joined = true;
                Ok(())
            }
            Ok(NetReply::Failed { code }) => {
                warn!("join failed: code {}", code);
                Err(FetchError::Network)
            }
            _ => Err(FetchError::Network),
        }
    }

    /// GET `url` and parse the body as JSON
    pub fn get_json(&mut self, url: &str) -> Result<Value, FetchError> {
        self.join()?;

        let frame = NetCommand::HttpGet { url }
            .to_frame()
            .map_err(|_| FetchError::TooLarge)?;
        self.link.drain()?;
        self.link.send(&frame)?;

        let mut body = Vec::new();
        let mut expected_seq: u16 = 0;
        let mut out_of_order = false;
        let mut too_large = false;

        let status = loop {
            let reply = self.link.receive()?;
            match NetReply::from_frame(&reply) {
                Ok(NetReply::Body { seq, data }) => {
                    if seq != expected_seq {
                        out_of_order = true;
                    }
                    expected_seq = seq.wrapping_add(1);
                    if body.len() + data.len() > MAX_BODY_SIZE {
                        too_large = true;
                    } else if !too_large {
                        body.extend_from_slice(data);
                    }
                }
                Ok(NetReply::BodyEnd { status }) => break status,
                Ok(NetReply::Failed { code }) => {
                    warn!("request failed: code {}", code);
                    self.joined = false;
                    return Err(FetchError::Network);
                }
                Ok(_) => warn!("unexpected reply during request"),
                Err(e) => warn!("bad reply: {:?}", e),
            }
        };

        if too_large {
            return Err(FetchError::TooLarge);
        }
        if out_of_order {
            return Err(FetchError::InvalidBody);
        }
        if status != HTTP_OK {
            return Err(FetchError::Status(status));
        }
        serde_json::from_slice(&body).map_err(|_| FetchError::InvalidBody)
    }

    /// Current Unix time from the co-processor's NTP client
    pub fn unix_time(&mut self) -> Result<u64, FetchError> {
        self.join()?;

        let frame = NetCommand::TimeRequest
            .to_frame()
            .map_err(|_| FetchError::Network)?;
        let reply = self.link.request(&frame)?;
        match NetReply::from_frame(&reply) {
            Ok(NetReply::Time { unix }) => Ok(unix),
            Ok(NetReply::Failed { code }) => {
                warn!("time request failed: code {}", code);
                self.joined = false;
                Err(FetchError::Network)
            }
            _ => Err(FetchError::InvalidBody),
        }
    }
}

/// One co-processor shared by the time and weather sources
pub struct SharedNetwork<'a, U>(&'a RefCell<NetworkLink<U>>);

impl<'a, U> SharedNetwork<'a, U> {
    pub fn new(link: &'a RefCell<NetworkLink<U>>) -> Self {
        Self(link)
    }
}

impl<U> WeatherSource for SharedNetwork<'_, U>
where
    U: Read + Write + ReadReady,
{
    fn fetch(&mut self, url: &str) -> Result<Value, FetchError> {
        self.0.borrow_mut().get_json(url)
    }
}

impl<U> TimeSource for SharedNetwork<'_, U>
where
    U: Read + Write + ReadReady,
{
    fn sync_time(&mut self) -> Result<u64, FetchError> {
        self.0.borrow_mut().unix_time()
    }
}
