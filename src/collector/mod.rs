//! Equivalence class collection.
//!
//! A [`Collector`] turns the hit set of one read into an equivalence class id
//! and keeps the per-class counts until the end of the run, when
//! [`Collector::write`] serializes them. The serialization format belongs to
//! the collector.

pub mod counter;

use std::io::{self, Write};

use crate::core::types::{EcId, Hit};

pub use counter::EcCounter;

/// Counting collector contract
pub trait Collector {
    /// Resolve the hits of one read to a class and count it.
    ///
    /// Returns `None` when the hits admit no consistent class.
    fn collect(&mut self, hits: &[Hit]) -> Option<EcId>;

    /// Serialize all accumulated per-class counts
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    fn write(&self, out: &mut dyn Write) -> io::Result<()>;
}
