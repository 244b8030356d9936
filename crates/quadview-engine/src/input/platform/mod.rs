//! Platform event translation.
//!
//! Kept crate-private so the public input API stays platform-agnostic.

pub(crate) mod winit;
