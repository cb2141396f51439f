//! Core data types for the read-to-class pipeline.
//!
//! - [`Hit`]: a `(transcript, position)` pair produced by a matcher
//! - [`HitSet`]: the per-read hit buffer
//! - [`Read`]: one logical read, single or paired
//! - [`EcId`]: equivalence class identifier
//!
//! [`dna`] holds the nucleotide helpers (complement, 2-bit encoding).

pub mod dna;
pub mod types;

pub use types::{EcId, Hit, HitSet, Read};
