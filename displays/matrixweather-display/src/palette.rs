//! Palette brightness scaling
//!
//! LED matrices have no useful global dimming at low bit depths, so the
//! renderer dims by scaling the colours themselves. Each reference colour
//! keeps its hue; every channel is multiplied by `brightness ^ gamma`.
//!
//! With `normalize` set, the reference palette is first stretched so its
//! brightest channel reaches full scale. This keeps dark source artwork
//! (the icon sheet) visible at low brightness settings.

/// Scale factor for a brightness/gamma pair, as a 0-255 level
pub fn fade_level(brightness: f32, gamma: f32) -> u8 {
    libm::roundf(fade_factor(brightness, gamma) * 255.0) as u8
}

fn fade_factor(brightness: f32, gamma: f32) -> f32 {
    let brightness = brightness.clamp(0.0, 1.0);
    if brightness == 0.0 {
        return 0.0;
    }
    libm::powf(brightness, gamma).clamp(0.0, 1.0)
}

/// A fixed-size palette of 0xRRGGBB colours scaled by a brightness setting
#[derive(Debug, Clone)]
pub struct PaletteFader<const N: usize> {
    reference: [u32; N],
    brightness: f32,
    gamma: f32,
    normalize: bool,
    palette: [u32; N],
}

impl<const N: usize> PaletteFader<N> {
    pub fn new(reference: [u32; N], brightness: f32, gamma: f32, normalize: bool) -> Self {
        let mut fader = Self {
            reference,
            brightness: brightness.clamp(0.0, 1.0),
            gamma,
            normalize,
            palette: [0; N],
        };
        fader.refresh();
        fader
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness.clamp(0.0, 1.0);
        self.refresh();
    }

    /// Scaled colour at `index`, or black when out of range
    pub fn color(&self, index: usize) -> u32 {
        self.palette.get(index).copied().unwrap_or(0)
    }

    pub fn palette(&self) -> &[u32; N] {
        &self.palette
    }

    fn refresh(&mut self) {
        let mut scale = fade_factor(self.brightness, self.gamma);

        if self.normalize {
            let peak = self
                .reference
                .iter()
                .flat_map(|&c| channels(c))
                .max()
                .unwrap_or(0);
            if peak > 0 {
                scale *= 255.0 / peak as f32;
            }
        }

        for (out, &reference) in self.palette.iter_mut().zip(self.reference.iter()) {
            let [r, g, b] = channels(reference).map(|c| scale_channel(c, scale));
            *out = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }
    }
}

fn channels(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

fn scale_channel(channel: u8, scale: f32) -> u8 {
    libm::roundf(channel as f32 * scale).clamp(0.0, 255.0) as u8
}
