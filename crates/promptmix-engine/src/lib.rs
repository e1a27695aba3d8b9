//! Randomized-library combination engine for promptmix.
//!
//! Given a configuration of named libraries, this crate samples values
//! (weighted, categorical, or sequential), assembles combination strings by
//! template or fragment join, enumerates Cartesian products, deduplicates
//! batches through an explicit [`Session`], and applies per-library
//! overrides to generated batches.

pub mod combine;
pub mod describe;
pub mod errors;
pub mod overrides;
pub mod report;
pub mod sampling;
pub mod session;

pub use combine::{
    generate_batch, generate_batch_described, generate_cartesian, generate_random,
    generate_unique, generate_unique_described,
};
pub use describe::ImageDescriber;
pub use errors::EngineError;
pub use overrides::apply_overrides;
pub use report::BatchReport;
pub use session::Session;
