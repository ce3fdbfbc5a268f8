//! Domain Services
//!
//! Pure business logic over the contract aggregate. No I/O; every function
//! takes the current time as an argument.

mod lifecycle;
mod progress_calculator;

pub use lifecycle::{LifecycleError, MilestoneLifecycle, Transition, TransitionReason};
pub use progress_calculator::{ProgressCalculator, ProgressCounts};
