//! Brightness buttons

use matrixweather_display::WeatherGraphics;

use crate::config::DisplaySettings;
use crate::traits::Button;

/// Up/down palette brightness adjustment within fixed limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessControl {
    step: f32,
    min: f32,
    max: f32,
}

impl BrightnessControl {
    pub fn new(step: f32, min: f32, max: f32) -> Self {
        Self { step, min, max }
    }

    pub fn from_settings(display: &DisplaySettings) -> Self {
        Self::new(
            display.brightness_step,
            display.brightness_min,
            display.brightness_max,
        )
    }

    /// Sample both buttons once and apply the result to `graphics`
    ///
    /// Returns the new brightness if it changed.
    pub fn poll<B: Button>(
        &self,
        up: &mut B,
        down: &mut B,
        graphics: &mut WeatherGraphics,
    ) -> Option<f32> {
        let current = graphics.brightness();
        let mut target = current;

        if up.is_pressed() {
            target = (target + self.step).min(self.max);
        }
        if down.is_pressed() {
            target = (target - self.step).max(self.min);
        }

        if target == current {
            return None;
        }

        graphics.set_brightness(target);
        info!("display brightness: {}", target);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixweather_display::{GraphicsConfig, Units};
    use proptest::prelude::*;

    struct Held(bool);

    impl Button for Held {
        fn is_pressed(&mut self) -> bool {
            self.0
        }
    }

    fn graphics(brightness: f32) -> WeatherGraphics {
        let config = GraphicsConfig {
            brightness,
            ..GraphicsConfig::default()
        };
        WeatherGraphics::new(config, Units::Imperial)
    }

    fn control() -> BrightnessControl {
        BrightnessControl::from_settings(&DisplaySettings::default())
    }

    #[test]
    fn test_up_raises_by_step() {
        let mut g = graphics(0.5);
        let changed = control().poll(&mut Held(true), &mut Held(false), &mut g);
        assert_eq!(changed, Some(0.51));
        assert_eq!(g.brightness(), 0.51);
    }

    #[test]
    fn test_down_stops_at_minimum() {
        let mut g = graphics(0.065);
        assert_eq!(
            control().poll(&mut Held(false), &mut Held(true), &mut g),
            Some(0.06)
        );
        assert_eq!(
            control().poll(&mut Held(false), &mut Held(true), &mut g),
            None
        );
    }

    #[test]
    fn test_up_stops_at_maximum() {
        let mut g = graphics(1.0);
        assert_eq!(
            control().poll(&mut Held(true), &mut Held(false), &mut g),
            None
        );
    }

    #[test]
    fn test_idle_buttons_change_nothing() {
        let mut g = graphics(0.1);
        assert_eq!(
            control().poll(&mut Held(false), &mut Held(false), &mut g),
            None
        );
        assert_eq!(g.brightness(), 0.1);
    }

    proptest! {
        #[test]
        fn prop_brightness_stays_within_limits(
            start in 0.06f32..=1.0,
            presses in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..200),
        ) {
            let control = control();
            let mut g = graphics(start);
            for (up, down) in presses {
                control.poll(&mut Held(up), &mut Held(down), &mut g);
                prop_assert!(g.brightness() >= 0.06);
                prop_assert!(g.brightness() <= 1.0);
            }
        }
    }
}
