//! High-level compile pipeline.
//!
//! [`compile`] drives the full front end for a root file: load, lex, parse,
//! walk the import graph (each file loaded once, cycles rejected), then run
//! resolution. [`compile_str`] does the same for in-memory source, with
//! imports resolved against the process working directory.

use bitproto_ast::ast::Declaration;
use bitproto_ast::foundation::{SourceMap, Span};
use bitproto_ast::ir::Schema;
use bitproto_ast::{CompileError, DiagnosticFormatter, ErrorKind};
use bitproto_lexer::Token;
use bitproto_parser::{parse_file, ParseError};
use bitproto_resolve::{resolve, ParsedProto};
use logos::Logos;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A successful compilation.
#[derive(Debug)]
pub struct Compiled {
    pub schema: Schema,
    pub source_map: SourceMap,
    /// Non-fatal diagnostics (lints).
    pub warnings: Vec<CompileError>,
}

/// Compiles the proto rooted at `root`, following its imports.
pub fn compile(root: &Path) -> Result<Compiled, Vec<CompileError>> {
    let mut loader = Loader::default();
    let root_idx = loader.load_path(root, None);
    finish(loader, root_idx)
}

/// Compiles in-memory source. Imports resolve relative to the current
/// working directory.
pub fn compile_str(source: &str) -> Result<Compiled, Vec<CompileError>> {
    let mut loader = Loader::default();
    let root_idx = loader.load_source(PathBuf::from("<input>"), source.to_string(), None);
    finish(loader, root_idx)
}

/// Formats diagnostics with source context.
pub fn format_errors(errors: &[CompileError], source_map: &SourceMap) -> String {
    DiagnosticFormatter::new(source_map).format_all(errors)
}

fn finish(loader: Loader, root_idx: Option<usize>) -> Result<Compiled, Vec<CompileError>> {
    let Loader {
        source_map,
        files,
        errors,
        ..
    } = loader;

    let Some(root_idx) = root_idx else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    debug!(files = files.len(), "front end complete, resolving");
    let resolved = resolve(&files, root_idx)?;
    Ok(Compiled {
        schema: resolved.schema,
        source_map,
        warnings: resolved.warnings,
    })
}

/// Loads, lexes and parses files, walking imports depth-first so every
/// import lands before its importer.
#[derive(Default)]
struct Loader {
    source_map: SourceMap,
    files: Vec<ParsedProto>,
    /// Canonical path → index in `files`; each file is parsed once.
    loaded: HashMap<PathBuf, usize>,
    /// Files currently being parsed, for cycle detection.
    loading: Vec<PathBuf>,
    errors: Vec<CompileError>,
}

impl Loader {
    fn load_path(&mut self, path: &Path, origin: Option<Span>) -> Option<usize> {
        let origin = origin.unwrap_or_else(|| Span::zero(0));
        let canonical = match fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(err) => {
                self.errors.push(CompileError::new(
                    ErrorKind::ImportNotFound,
                    origin,
                    format!("cannot open '{}': {}", path.display(), err),
                ));
                return None;
            }
        };

        if let Some(idx) = self.loaded.get(&canonical) {
            return Some(*idx);
        }
        if self.loading.contains(&canonical) {
            self.errors.push(CompileError::new(
                ErrorKind::ImportCycle,
                origin,
                format!("importing '{}' forms a cycle", canonical.display()),
            ));
            return None;
        }

        let source = match fs::read_to_string(&canonical) {
            Ok(source) => source,
            Err(err) => {
                self.errors.push(CompileError::new(
                    ErrorKind::ImportNotFound,
                    origin,
                    format!("cannot read '{}': {}", canonical.display(), err),
                ));
                return None;
            }
        };

        self.loading.push(canonical.clone());
        let idx = self.load_source(canonical.clone(), source, Some(origin));
        self.loading.pop();

        if let Some(idx) = idx {
            self.loaded.insert(canonical, idx);
        }
        idx
    }

    fn load_source(
        &mut self,
        path: PathBuf,
        source: String,
        _origin: Option<Span>,
    ) -> Option<usize> {
        let file_id = self.source_map.add_file(path.clone(), source.clone());
        debug!(file = %path.display(), file_id, "loading");

        // Lexing
        let mut lexer = Token::lexer(&source);
        let mut tokens = Vec::new();
        let mut lex_failed = false;
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(_) => {
                    self.errors.push(CompileError::new(
                        ErrorKind::InvalidToken,
                        Span::new(file_id, span.start as u32, span.end as u32),
                        format!("invalid token '{}'", &source[span.clone()]),
                    ));
                    lex_failed = true;
                }
            }
        }
        if lex_failed {
            return None;
        }

        // Parsing
        let file = match parse_file(&tokens, file_id) {
            Ok(file) => file,
            Err(parse_errors) => {
                self.errors
                    .extend(parse_errors.into_iter().map(to_compile_error));
                return None;
            }
        };

        // Imports: relative paths resolve against this file's directory.
        // For in-memory source the base is empty, i.e. the working
        // directory.
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut import_targets = Vec::new();
        for decl in &file.decls {
            if let Declaration::Import(import) = decl {
                let import_path = Path::new(&import.path);
                let full = if import_path.is_absolute() {
                    import_path.to_path_buf()
                } else {
                    base_dir.join(import_path)
                };
                // A failed import keeps its slot so later targets stay
                // aligned; the recorded error aborts before resolution.
                let target = self.load_path(&full, Some(import.span)).unwrap_or(usize::MAX);
                import_targets.push(target);
            }
        }

        let idx = self.files.len();
        self.files.push(ParsedProto {
            file,
            filepath: path,
            import_targets,
        });
        Some(idx)
    }
}

fn to_compile_error(err: ParseError) -> CompileError {
    CompileError::new(ErrorKind::Syntax, err.span, err.message)
}
