// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # bitproto
//!
//! A schema language and codec for fixed-size, bit-packed binary messages.
//!
//! This crate is the facade over the compiler pipeline:
//!
//! ```text
//! bitproto-ast      - AST, resolved schema IR, diagnostics
//! bitproto-lexer    - tokenization
//! bitproto-parser   - hand-written recursive descent parser
//! bitproto-resolve  - symbols, constants, types, sizes, lint
//! bitproto-codec    - descriptor-driven bit-exact encode/decode
//! ```
//!
//! ## Usage
//!
//! ```
//! use bitproto::{compile_str, descriptor_for};
//!
//! let compiled = compile_str(
//!     "proto pen\n\
//!      message Pen { bool on = 1; uint3 color = 2 }",
//! )
//! .expect("compile failed");
//!
//! let id = compiled.schema.find_message("Pen").expect("message exists");
//! let descriptor = descriptor_for(&compiled.schema, id);
//! assert_eq!(descriptor.nbytes(), 1);
//! ```

// Re-export AST, IR and diagnostics
pub use bitproto_ast::{self as ast, CompileError, ErrorKind, Severity, SourceMap, Span};

// Re-export lexer
pub use bitproto_lexer as lexer;
pub use bitproto_lexer::Token;

// Re-export parser
pub use bitproto_parser as parser;
pub use bitproto_parser::{parse_file, ParseError};

// Re-export resolve
pub use bitproto_resolve as resolve;

// Re-export the runtime codec
pub use bitproto_codec as codec;

pub mod bridge;
pub mod compile;

pub use bridge::descriptor_for;
pub use compile::{compile, compile_str, format_errors, Compiled};

/// Compiler version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
