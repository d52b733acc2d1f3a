//! Foundation types shared by all compiler stages.

pub mod path;
pub mod span;

pub use path::Path;
pub use span::{SourceFile, SourceMap, Span};
