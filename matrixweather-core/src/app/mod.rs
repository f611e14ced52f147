//! Weather display application

pub mod brightness;
pub mod primary;

pub use brightness::BrightnessControl;
pub use primary::PrimaryLoop;
