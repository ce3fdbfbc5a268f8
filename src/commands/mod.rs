//! Command handlers for the pactline binary
//!
//! Each handler maps parsed CLI arguments onto a use case call and prints
//! the rendered result to stdout.

pub mod contract;
pub mod milestone;

use anyhow::Result;

use pactline::presentation::{Renderer, Services};

/// Everything a handler needs to run one command
pub struct CommandContext {
    pub services: Services,
    pub renderer: Renderer,
}

impl CommandContext {
    pub fn emit(&self, rendered: serde_json::Result<String>) -> Result<()> {
        println!("{}", rendered?);
        Ok(())
    }
}
