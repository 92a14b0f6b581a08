//! Core domain types shared by the bundling pipeline and the wizard.

pub mod errors;
pub mod model;
