//! Annotation format implementations.

mod isi;

#[cfg(test)]
mod tests;

pub use isi::{IsiFormat, OCCLUDED_SENTINEL};
