// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Semantic analysis for bitproto.
//!
//! Takes the parsed files of a compilation (imports already loaded and
//! cycle-checked) and produces a resolved [`Schema`](bitproto_ast::ir::Schema):
//! symbols bound, constants evaluated, types checked, bit sizes computed,
//! and style lints collected as warnings.
//!
//! Names resolve against declarations made before the point of use, walking
//! the scope chain outward: enclosing messages first, then proto scope, then
//! the import table. This matches the declare-before-use discipline of the
//! language and makes containment cycles unrepresentable.

pub mod resolve;

pub use resolve::{resolve, ParsedProto, Resolved};
