//! Shared fixture values.

pub const DEFAULT_OWNER: &str = "Grace Hopper";
