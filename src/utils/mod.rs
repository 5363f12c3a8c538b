//! Utility modules.

pub mod bootstrap;
pub mod response_builder;
