//! API endpoint implementations.

pub mod orders;
