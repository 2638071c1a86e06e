//! Internal numeric helpers.

pub mod matrix;
