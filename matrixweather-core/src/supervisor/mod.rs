//! Failover supervisor
//!
//! Wraps the primary loop. The first failure it sees takes the device into
//! a degraded safe state: display dimmed and blanked, indicator blinking,
//! and in timed-reset mode a hardware reset after a grace period.

pub mod failover;
pub mod mode;
pub mod record;

pub use failover::{supervise, Directive, FailoverSupervisor, Primary};
pub use mode::{ModeEvent, OperationalMode};
pub use record::{FailureKind, FailureRecord};
