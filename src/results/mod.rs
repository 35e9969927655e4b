//! Search result types and the container that collects them
//!
//! This module defines the structures a search run produces and the
//! deduplicating, ranking container they are gathered in.

mod container;
mod types;

pub use container::ResultContainer;
pub use types::*;
