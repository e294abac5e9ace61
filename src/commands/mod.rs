//! CLI command implementations.

pub mod cluster;
pub mod completions;
pub mod component;
pub mod extensions;
