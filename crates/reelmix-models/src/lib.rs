//! Shared data models for ReelMix.
//!
//! This crate provides Serde-serializable types for:
//! - Classified clips and their roles
//! - Generated sequences and their combination signatures
//! - Opaque payload handles pointing at externally owned media

pub mod clip;
pub mod sequence;

// Re-export common types
pub use clip::{Clip, ClipId, ClipRole, ParseRoleError, PayloadHandle};
pub use sequence::{CombinationSignature, Sequence, SequenceId};
