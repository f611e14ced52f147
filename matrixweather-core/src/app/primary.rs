//! Primary loop
//!
//! One `step` is one pass of the application cycle:
//! 1. time sync, if due
//! 2. weather fetch and render, if due
//! 3. description scroll and brightness buttons, if the scroll delay has
//!    passed
//!
//! The first step only starts up: it checks the credentials, builds the
//! request URL and the graphics, and presents the first frame with the
//! panel held dark until the frame is ready.

use matrixweather_display::{MatrixBackend, WeatherGraphics};

use super::brightness::BrightnessControl;
use crate::config::{
    weather_url, DisplaySettings, Secrets, Settings, WeatherSettings, WeatherUrl,
};
use crate::device::DeviceContext;
use crate::error::{AppError, ConfigError};
use crate::scheduler::{FetchScheduler, FetchTarget};
use crate::supervisor::Primary;
use crate::traits::{Button, Clock, Indicator, TimeSource, WeatherSource};

/// Panel brightness once the first frame is up
const PANEL_ON: f32 = 1.0;

pub struct PrimaryLoop<T, W> {
    secrets: Result<Secrets, ConfigError>,
    weather_settings: WeatherSettings,
    display: DisplaySettings,
    scheduler: FetchScheduler,
    brightness: BrightnessControl,
    time: T,
    weather: W,
    graphics: Option<WeatherGraphics>,
    url: WeatherUrl,
    last_scroll_ms: u64,
    /// Unix seconds at the last sync, with the monotonic time it was taken
    synced: Option<(u64, u64)>,
}

impl<T, W> PrimaryLoop<T, W>
where
    T: TimeSource,
    W: WeatherSource,
{
    pub fn new(settings: Settings, time: T, weather: W) -> Self {
        Self {
            scheduler: FetchScheduler::new(&settings.schedule),
            brightness: BrightnessControl::from_settings(&settings.display),
            secrets: settings.secrets,
            weather_settings: settings.weather,
            display: settings.display,
            time,
            weather,
            graphics: None,
            url: WeatherUrl::new(),
            last_scroll_ms: 0,
            synced: None,
        }
    }

    /// Whether startup has completed
    pub fn is_started(&self) -> bool {
        self.graphics.is_some()
    }

    pub fn graphics(&self) -> Option<&WeatherGraphics> {
        self.graphics.as_ref()
    }

    pub fn scheduler(&self) -> &FetchScheduler {
        &self.scheduler
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current Unix time, extrapolated from the last sync
    pub fn unix_time(&self, now_ms: u64) -> Option<u64> {
        self.synced
            .map(|(unix, at_ms)| unix + now_ms.saturating_sub(at_ms) / 1000)
    }

    fn start<D, I, B, C>(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Result<(), AppError>
    where
        D: MatrixBackend,
        C: Clock,
    {
        info!("weather display starting");

        let secrets = self.secrets.as_ref().map_err(|e| *e)?;
        self.url = weather_url(&self.weather_settings, secrets)?;

        // Splash goes up dark, then the panel is switched on
        device.display.set_brightness(0.0)?;
        let graphics = WeatherGraphics::new(
            self.display.graphics_config(),
            self.weather_settings.units,
        );
        device.display.present(graphics.frame())?;
        device.display.set_brightness(PANEL_ON)?;

        self.last_scroll_ms = device.clock.now_ms();
        self.graphics = Some(graphics);
        Ok(())
    }

    fn run<D, I, B, C>(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Result<(), AppError>
    where
        D: MatrixBackend,
        I: Indicator,
        B: Button,
        C: Clock,
    {
        let Some(graphics) = self.graphics.as_mut() else {
            return Ok(());
        };
        let now = device.clock.now_ms();

        if self.scheduler.time_sync_due(now) {
            match self.time.sync_time() {
                Ok(unix) => {
                    debug!("time synced: {}", unix);
                    self.synced = Some((unix, now));
                    self.scheduler.record_success(FetchTarget::TimeSync, now);
                }
                Err(e) => self
                    .scheduler
                    .record_failure(FetchTarget::TimeSync, e, now)?,
            }
        }

        if self.scheduler.weather_due(now) {
            info!(
                "Getting weather for {}",
                self.weather_settings.location.as_str()
            );
            device.indicator.set_on(true);
            let fetched = self.weather.fetch(&self.url);
            device.indicator.set_on(false);

            match fetched {
                Ok(weather) => {
                    graphics.display_weather(&weather);
                    device.display.present(graphics.frame())?;
                    self.scheduler.record_success(FetchTarget::Weather, now);
                }
                Err(e) => self
                    .scheduler
                    .record_failure(FetchTarget::Weather, e, now)?,
            }
        }

        if now.saturating_sub(self.last_scroll_ms) >= self.display.scroll_delay_ms {
            self.last_scroll_ms = now;
            graphics.scroll_description();
            self.brightness
                .poll(&mut device.up, &mut device.down, graphics);
            device.display.present(graphics.frame())?;
        }

        Ok(())
    }
}

impl<D, I, B, C, T, W> Primary<D, I, B, C> for PrimaryLoop<T, W>
where
    D: MatrixBackend,
    I: Indicator,
    B: Button,
    C: Clock,
    T: TimeSource,
    W: WeatherSource,
{
    fn step(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Result<(), AppError> {
        if self.is_started() {
            self.run(device)
        } else {
            self.start(device)
        }
    }
}
