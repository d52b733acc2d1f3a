//! Compile-time diagnostics.
//!
//! Every stage of the compiler reports problems as [`CompileError`] values:
//! a categorized kind, a severity, a primary source span, and optional
//! secondary labels and notes. [`DiagnosticFormatter`] renders them with the
//! offending source line and a caret underline.

use crate::foundation::{SourceMap, Span};
use std::fmt;

/// A single diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
    /// Related code locations ("first defined here").
    pub labels: Vec<Label>,
    /// Extra context or suggestions.
    pub notes: Vec<String>,
}

/// Category of diagnostic, grouped by the stage that detects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Lexing
    /// Unrecognized token or bad escape sequence.
    InvalidToken,

    // Parsing
    /// Grammar violation: unexpected token, missing brace, bad field syntax.
    Syntax,

    // Name resolution
    /// Reference does not resolve to any definition.
    UndefinedName,
    /// Name already taken in the same scope.
    DuplicateName,
    /// Alias target is a named type (message or enum), or another alias.
    InvalidAlias,

    // Type checking
    /// Integer bit width outside 1..=64.
    InvalidWidth,
    /// Array capacity outside 1..=65535, or unsupported element type.
    InvalidArray,
    /// Enum backing type not uint, or member value exceeds the backing width.
    InvalidEnum,
    /// Field number duplicated or outside 1..=255.
    InvalidFieldNumber,
    /// Message exceeds 65535 bits or its `max_bytes` option.
    SizeOverflow,
    /// A message or alias chain contains itself.
    RecursiveType,

    // Constants
    /// Constant expression failed to evaluate (overflow, division by zero,
    /// or a non-integer reference in a calculation).
    InvalidCalculation,

    // Options
    /// Option name not recognized in this scope.
    UnknownOption,
    /// Option value has the wrong type or an out-of-range value.
    InvalidOption,

    // Extensibility
    /// The extensible marker on an entity that cannot carry it.
    InvalidExtensible,

    // Imports
    /// Imported file missing or unreadable.
    ImportNotFound,
    /// Import chain loops back to a file already being parsed.
    ImportCycle,
    /// Same file imported twice by one proto.
    DuplicateImport,

    /// Style issue; always reported at warning severity.
    Lint,

    /// Bug in the compiler itself.
    Internal,
}

impl ErrorKind {
    /// Short human-readable name, used as the diagnostic header.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "invalid token",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::UndefinedName => "undefined name",
            ErrorKind::DuplicateName => "duplicate name",
            ErrorKind::InvalidAlias => "invalid alias",
            ErrorKind::InvalidWidth => "invalid bit width",
            ErrorKind::InvalidArray => "invalid array",
            ErrorKind::InvalidEnum => "invalid enum",
            ErrorKind::InvalidFieldNumber => "invalid field number",
            ErrorKind::SizeOverflow => "size overflow",
            ErrorKind::RecursiveType => "recursive type",
            ErrorKind::InvalidCalculation => "invalid calculation",
            ErrorKind::UnknownOption => "unknown option",
            ErrorKind::InvalidOption => "invalid option",
            ErrorKind::InvalidExtensible => "invalid extensible marker",
            ErrorKind::ImportNotFound => "import not found",
            ErrorKind::ImportCycle => "import cycle",
            ErrorKind::DuplicateImport => "duplicate import",
            ErrorKind::Lint => "lint",
            ErrorKind::Internal => "internal compiler error",
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// A secondary labeled span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl CompileError {
    /// An error-severity diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self::with_severity(kind, Severity::Error, span, message.into())
    }

    /// A warning-severity diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message.into())
    }

    fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Result alias for operations producing one diagnostic on failure.
pub type CompileResult<T> = Result<T, CompileError>;

/// Renders diagnostics with source snippets.
///
/// Output shape:
///
/// ```text
/// error: duplicate name: 'Color' already defined in this scope
///   --> pen.bitproto:9:6
///    |
///  9 | enum Color : uint3 {
///    |      ^^^^^
///    = note: first defined here
///      at pen.bitproto:3:6
/// ```
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Formats one diagnostic with location, snippet and underline.
    pub fn format(&self, error: &CompileError) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{}: {}: {}\n",
            error.severity,
            error.kind.name(),
            error.message
        ));

        let path = self.sources.file_path(&error.span);
        let (line, col) = self.sources.line_col(&error.span);
        out.push_str(&format!("  --> {}:{}:{}\n", path.display(), line, col));

        let file = self.sources.file(&error.span);
        if let Some(text) = file.line_text(line) {
            let text = text.trim_end_matches('\n');
            out.push_str("   |\n");
            out.push_str(&format!("{:3} | {}\n", line, text));

            let start = col as usize;
            let width = (error.span.end - error.span.start) as usize;
            let underline =
                " ".repeat(start.saturating_sub(1)) + &"^".repeat(width.clamp(1, text.len() + 1));
            out.push_str(&format!("   | {}\n", underline));
        }

        for label in &error.labels {
            out.push_str(&format!("   = note: {}\n", label.message));
            let (lline, lcol) = self.sources.line_col(&label.span);
            let lpath = self.sources.file_path(&label.span);
            out.push_str(&format!("     at {}:{}:{}\n", lpath.display(), lline, lcol));
        }

        for note in &error.notes {
            out.push_str(&format!("   = help: {}\n", note));
        }

        out
    }

    /// Formats a batch of diagnostics, blank-line separated.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
