//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod clock;
pub mod indicator;
pub mod input;
pub mod source;

pub use clock::Clock;
pub use indicator::Indicator;
pub use input::Button;
pub use source::{FetchError, TimeSource, WeatherSource};
