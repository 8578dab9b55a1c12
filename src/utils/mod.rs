//! Utility modules for common functionality.
//!
//! - constants: Constants for the application
//! - logging: Logging utilities

pub mod constants;
pub mod logging;

pub use constants::*;
