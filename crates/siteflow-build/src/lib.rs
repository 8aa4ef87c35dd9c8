//! SiteFlow site build
//!
//! Runs the static-site generator (Hugo by default) in the project root and
//! locates the directory it produced. The generator itself is an opaque
//! external command; only its exit status and output are inspected.

pub mod builder;
pub mod error;
pub mod progress;

pub use builder::{BuildOutput, SiteBuilder};
pub use error::{BuildError, Result};
pub use progress::BuildProgress;
