//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod catalog;
pub mod export;
pub mod ndvi;
pub mod store;
pub mod users;

// Re-export all handlers for use in router
pub use analysis::*;
pub use catalog::*;
pub use export::*;
pub use ndvi::*;
pub use store::*;
pub use users::*;
