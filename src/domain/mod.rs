//! Domain Layer
//!
//! The core of Pactline: contracts, milestones and the rules that keep a
//! contract's `paid` and `progress` consistent with its milestones.
//!
//! ## Structure
//!
//! - `entities/` - Contract aggregate and milestones
//! - `value_objects/` - Ids, statuses, progress
//! - `services/` - Milestone lifecycle and progress calculation
//! - `ports/` - Storage gateway interface
//!
//! This layer never touches the file system directly. All persistence goes
//! through [`ports::StorageGateway`].

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
