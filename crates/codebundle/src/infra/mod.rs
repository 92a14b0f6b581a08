//! Infrastructure adapters for configuration, console IO, logging, and response files.

pub mod config;
pub mod console;
pub mod logging;
pub mod response;
