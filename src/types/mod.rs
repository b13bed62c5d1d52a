//! Core type definitions using newtype patterns for type safety.
//!
//! A `Target` can only be obtained through validation, so every scan
//! downstream of the CLI works on a well-formed origin.

mod port;
mod target;

pub use port::{Port, PortError, PortSpec};
pub use target::{Scheme, Target, TargetError};
