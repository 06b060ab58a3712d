//! Command implementations.
//!
//! Each command returns the text to print on stdout so the output can be
//! checked without spawning the binary.

pub mod keygen;
pub mod sign;
pub mod verify;
