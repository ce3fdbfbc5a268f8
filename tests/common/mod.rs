//! Common test utilities for Pactline CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated environment with its own ledger file and config dir
//! - Assertion macros: `assert_success!`, `assert_exit_code!`, `assert_output_contains!`
//! - Fixtures: Shared values

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
