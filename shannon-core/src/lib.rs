//! Shannon approximation engine.
//!
//! This crate builds empirical frequency models of a text corpus and
//! synthesizes new text from them, reproducing Shannon's series of
//! approximations to a natural language source:
//! - Uniform and frequency-weighted (context-free) character and word models
//! - Fixed-order character models (digram, trigram, tetragram)
//! - A generalized n-gram character model of arbitrary order
//! - Seedable roulette-wheel sampling over the trained tables
//!
//! Tables are rebuilt from the corpus on each run; nothing is persisted.

/// Error taxonomy shared by every model-building and sampling operation.
pub mod error;

/// Corpus snapshot and its character / word segmentation.
pub mod corpus;

/// Frequency tables, distributions, samplers and the model builder.
pub mod model;

/// Probability reports computed from trained tables.
pub mod report;

/// I/O utilities (corpus loading).
///
/// Not exposed
pub(crate) mod io;

pub use corpus::Corpus;
pub use error::{ModelError, Result};
