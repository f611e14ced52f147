//! Weather icon selection
//!
//! OpenWeatherMap icon codes are two digits for the condition family
//! followed by `d` (day) or `n` (night), e.g. `"10n"`. The sprite sheet
//! holds one row per family with the day sprite in column 0 and the night
//! sprite in column 1.

/// Icon families in sprite sheet row order
pub const ICON_FAMILIES: [&str; 9] = ["01", "02", "03", "04", "09", "10", "11", "13", "50"];

/// A resolved sprite sheet position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IconSelection {
    /// Row in the sprite sheet
    pub family: u8,
    /// Night column instead of day column
    pub night: bool,
}

impl IconSelection {
    /// Resolve an icon code
    ///
    /// Returns `None` for codes shorter than three characters and for
    /// unknown families; the icon is left blank in both cases.
    pub fn from_code(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() < 3 {
            return None;
        }

        let family = ICON_FAMILIES
            .iter()
            .position(|f| f.as_bytes() == &bytes[..2])?;

        Some(Self {
            family: family as u8,
            night: bytes[2] == b'n',
        })
    }

    /// Linear index into the sprite sheet (two sprites per family)
    pub const fn sprite_index(&self) -> u8 {
        self.family * 2 + self.night as u8
    }
}
