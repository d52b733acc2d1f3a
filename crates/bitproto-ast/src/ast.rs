//! Untyped parse tree.
//!
//! One [`FileAst`] per parsed `.bitproto` file. Nothing here is resolved:
//! type references are still dotted paths, constant expressions are still
//! expression trees, and no sizes have been computed. Resolution turns a set
//! of these into an [`ir::Schema`](crate::ir::Schema).

use crate::foundation::{Path, Span};

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct FileAst {
    /// Id of this file in the compilation's `SourceMap`.
    pub file_id: u16,
    /// Declared proto name (`proto drone`).
    pub proto_name: Option<ProtoNameDecl>,
    pub decls: Vec<Declaration>,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Import(ImportDecl),
    Option(OptionDecl),
    Const(ConstDecl),
    Alias(AliasDecl),
    Enum(EnumDecl),
    Message(MessageDecl),
}

/// `proto <name>`
#[derive(Debug, Clone)]
pub struct ProtoNameDecl {
    pub name: String,
    pub span: Span,
}

/// `import "shared.bitproto"` or `import lib "shared.bitproto"`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub alias: Option<String>,
    /// Path string as written in source.
    pub path: String,
    pub span: Span,
}

/// `option c.name_prefix = "Bp"`
#[derive(Debug, Clone)]
pub struct OptionDecl {
    /// Dotted option name, joined (`c.name_prefix`, `max_bytes`).
    pub name: String,
    pub value: ConstExpr,
    pub span: Span,
}

/// `const N = 3 * WHEELS`
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub name: String,
    pub value: ConstExpr,
    pub span: Span,
}

/// `type Timestamp = int64`, or the deprecated `typedef int64 Timestamp`.
#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: String,
    pub target: TypeExpr,
    /// Written with the deprecated `typedef` keyword; linted.
    pub legacy_syntax: bool,
    pub span: Span,
}

/// `enum Color : uint3 { ... }`
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    /// Declared backing width (`uint3` gives 3).
    pub backing_nbits: u32,
    pub members: Vec<EnumMemberDecl>,
    /// Span of a stray `'` after the backing type. Enums cannot be
    /// extensible; resolution reports this as an error.
    pub extensible_marker: Option<Span>,
    pub span: Span,
}

/// `RED = 1`
#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub name: String,
    pub value: u64,
    pub span: Span,
}

/// `message Drone { ... }` / `message Drone' { ... }`
#[derive(Debug, Clone)]
pub struct MessageDecl {
    pub name: String,
    pub extensible: bool,
    pub items: Vec<MessageItem>,
    pub span: Span,
}

/// A declaration inside a message body.
#[derive(Debug, Clone)]
pub enum MessageItem {
    Field(FieldDecl),
    Option(OptionDecl),
    Const(ConstDecl),
    Alias(AliasDecl),
    Enum(EnumDecl),
    Message(MessageDecl),
}

/// `uint3 status = 2`
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    /// As written; range-checked during resolution.
    pub number: u64,
    pub span: Span,
}

/// A type as written in source.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeExprKind {
    Bool,
    Byte,
    /// `uint<N>`; width checked during resolution.
    Uint(u32),
    /// `int<N>`; width checked during resolution.
    Int(u32),
    /// Reference to a named type, possibly dotted.
    Reference(Path),
    /// `elem[cap]`, optionally marked extensible with a trailing `'`.
    Array {
        elem: Box<TypeExpr>,
        cap: ConstExpr,
        extensible: bool,
    },
}

/// A compile-time constant expression.
#[derive(Debug, Clone)]
pub struct ConstExpr {
    pub kind: ConstExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ConstExprKind {
    Int(u64),
    Bool(bool),
    Str(String),
    /// Reference to a constant, possibly dotted.
    Reference(Path),
    Binary {
        op: BinOp,
        lhs: Box<ConstExpr>,
        rhs: Box<ConstExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}
