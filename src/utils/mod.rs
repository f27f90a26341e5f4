//! Shared helpers: input limits, object ID checks and message formatting.

pub mod validation;
