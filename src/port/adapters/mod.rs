//! Adapter implementations for the transport and registry ports.

pub mod memory;
