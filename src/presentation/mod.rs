//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command-line definition
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Text and JSON renderers
//!
//! ## Usage
//!
//! ```ignore
//! use pactline::presentation::factory;
//!
//! let services = factory::create_services(&config);
//! let contract = services.contracts.get(id)?;
//! ```

pub mod cli;
pub mod factory;
pub mod output;

pub use factory::{create_gateway, create_services, create_services_with_gateway, Services};
pub use output::{OutputFormat, Renderer};
