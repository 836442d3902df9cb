//! Agent implementations.

pub mod structured;

pub use structured::StructuredAgent;
