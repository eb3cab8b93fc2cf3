//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_store, build_analyzer)
//! - `analyze` - Run an analysis, export it, save it to history
//! - `history` - List and delete saved analyses
//! - `parameters` - Parameter catalog listing
//! - `serve` - Web server command

pub mod analyze;
pub mod core;
pub mod history;
pub mod parameters;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use history::*;
pub use parameters::*;
pub use serve::*;
