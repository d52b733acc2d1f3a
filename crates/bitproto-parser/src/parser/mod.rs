//! Recursive descent parser.
//!
//! [`parse_file`] drives the top-level declaration loop with error recovery:
//! when a declaration fails to parse, the error is recorded and the stream
//! skips forward to the next declaration keyword, so one run reports every
//! syntax error in the file.

pub mod decl;
pub mod error;
pub mod stream;
pub mod types;

pub use error::{ParseError, ParseErrorKind};
pub use stream::TokenStream;

use bitproto_ast::ast::{Declaration, FileAst, ProtoNameDecl};
use bitproto_ast::foundation::Span;
use bitproto_lexer::Token;
use std::ops::Range;

/// Parses one file's token stream into a [`FileAst`].
///
/// Returns all syntax errors found; the AST is only returned when the file
/// parsed cleanly.
pub fn parse_file(
    tokens: &[(Token, Range<usize>)],
    file_id: u16,
) -> Result<FileAst, Vec<ParseError>> {
    let mut stream = TokenStream::new(tokens, file_id);
    let mut file = FileAst {
        file_id,
        proto_name: None,
        decls: Vec::new(),
    };
    let mut errors = Vec::new();

    while !stream.at_end() {
        let result = match stream.peek() {
            Some(Token::Semicolon) => {
                stream.advance();
                continue;
            }
            Some(Token::Proto) => match parse_proto_name(&mut stream) {
                Ok(name_decl) => {
                    if file.proto_name.is_some() {
                        Err(ParseError::invalid(
                            "proto name already declared for this file",
                            name_decl.span,
                        ))
                    } else {
                        file.proto_name = Some(name_decl);
                        Ok(None)
                    }
                }
                Err(err) => Err(err),
            },
            Some(Token::Import) => decl::parse_import(&mut stream).map(Declaration::Import).map(Some),
            Some(Token::Option) => decl::parse_option(&mut stream).map(Declaration::Option).map(Some),
            Some(Token::Const) => decl::parse_const(&mut stream).map(Declaration::Const).map(Some),
            Some(Token::Type) | Some(Token::Typedef) => {
                decl::parse_alias(&mut stream).map(Declaration::Alias).map(Some)
            }
            Some(Token::Enum) => decl::parse_enum(&mut stream).map(Declaration::Enum).map(Some),
            Some(Token::Message) => decl::parse_message(&mut stream).map(Declaration::Message).map(Some),
            found => Err(ParseError::unexpected(
                found,
                "at top level, expected a declaration",
                stream.current_span(),
            )),
        };

        match result {
            Ok(Some(declaration)) => file.decls.push(declaration),
            Ok(None) => {}
            Err(err) => {
                errors.push(err);
                // Step past the failing token so recovery always advances.
                stream.advance();
                stream.synchronize();
            }
        }
    }

    if file.proto_name.is_none() && errors.is_empty() {
        errors.push(ParseError::invalid(
            "missing 'proto <name>' statement",
            Span::zero(file_id),
        ));
    }

    if errors.is_empty() {
        Ok(file)
    } else {
        Err(errors)
    }
}

/// `proto <name> [;]`
fn parse_proto_name(stream: &mut TokenStream) -> Result<ProtoNameDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Proto)?;
    let (name, _) = expect_ident(stream, "after 'proto'")?;
    stream.eat_semicolon();
    Ok(ProtoNameDecl {
        name,
        span: stream.span_from(start),
    })
}

/// Consumes an identifier, failing with context on anything else.
pub(crate) fn expect_ident(
    stream: &mut TokenStream,
    context: &str,
) -> Result<(String, Span), ParseError> {
    match stream.peek() {
        Some(Token::Ident(name)) => {
            let name = name.clone();
            let span = stream.current_span();
            stream.advance();
            Ok((name, span))
        }
        found => Err(ParseError::unexpected(
            found,
            &format!("{}, expected an identifier", context),
            stream.current_span(),
        )),
    }
}

/// Consumes an integer literal.
pub(crate) fn expect_int_literal(
    stream: &mut TokenStream,
    context: &str,
) -> Result<(u64, Span), ParseError> {
    match stream.peek() {
        Some(Token::IntLiteral(value)) => {
            let value = *value;
            let span = stream.current_span();
            stream.advance();
            Ok((value, span))
        }
        found => Err(ParseError::unexpected(
            found,
            &format!("{}, expected an integer literal", context),
            stream.current_span(),
        )),
    }
}
