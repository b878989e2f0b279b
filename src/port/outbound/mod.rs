//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod completion;
pub mod usage;
