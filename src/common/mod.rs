//! Data shared across the compiler stages.
pub mod phrase;
