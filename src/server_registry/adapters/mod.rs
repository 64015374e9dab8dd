//! Adapter implementations for the server registry repository port.

pub mod memory;
pub mod postgres;
