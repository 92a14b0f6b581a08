//! Application layer orchestrating domain logic and infrastructure.

pub mod bundle;
pub mod filter;
pub mod scan;
pub mod sort;
pub mod transform;
pub mod wizard;
