//! Shared primitives used across the classifier, checks and logging.

pub mod span;

pub use span::{Position, SourceMap, Span};
