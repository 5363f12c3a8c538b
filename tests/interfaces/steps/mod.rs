//! Cucumber step definitions for interface tests.

pub mod order_service;
