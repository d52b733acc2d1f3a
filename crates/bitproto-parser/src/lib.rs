// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Parser for the bitproto schema language.
//!
//! A hand-written recursive descent parser over the token stream produced by
//! `bitproto-lexer`. Parsing one file yields a
//! [`FileAst`](bitproto_ast::ast::FileAst); nothing is resolved here: type
//! references stay as paths and constant expressions stay as trees.
//!
//! The parser recovers at declaration boundaries, so a single run reports
//! every syntax error in a file rather than stopping at the first.

pub mod parser;

pub use parser::error::{ParseError, ParseErrorKind};
pub use parser::{parse_file, TokenStream};
