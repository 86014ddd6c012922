//! Shared plumbing used across the interpreter pipeline: positioned
//! errors and the source-cleaning/line-mapping collaborator.

mod error;
mod span;

pub use error::{Error, ErrorKind, Position, Result};
pub use span::SourceMap;
