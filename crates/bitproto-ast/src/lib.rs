// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST and schema IR for the bitproto compiler.
//!
//! This crate contains the untyped parse tree produced by the parser, the
//! resolved schema IR produced by semantic analysis, and the shared
//! foundation types (source spans, dotted paths, diagnostics) used by every
//! compiler stage.

pub mod ast;
pub mod error;
pub mod foundation;
pub mod ir;

pub use error::{CompileError, CompileResult, DiagnosticFormatter, ErrorKind, Label, Severity};
pub use foundation::{Path, SourceFile, SourceMap, Span};
