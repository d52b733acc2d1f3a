//! Type expressions, dotted paths, and constant expressions.

use super::{ParseError, TokenStream};
use bitproto_ast::ast::{BinOp, ConstExpr, ConstExprKind, TypeExpr, TypeExprKind};
use bitproto_ast::foundation::Path;
use bitproto_lexer::Token;

/// Parses a type: a base type or type reference, optionally followed by one
/// array suffix `[cap]` and an extensible marker `'`.
///
/// Array elements are single types; `byte[4][2]` is not grammatical. Nested
/// arrays are spelled through an alias.
pub fn parse_type_expr(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    let start = stream.current_pos();
    let single = parse_single_type(stream)?;

    if !stream.check(&Token::LBracket) {
        return Ok(single);
    }

    stream.advance();
    let cap = parse_const_expr(stream)?;
    stream.expect(Token::RBracket)?;
    let extensible = stream.eat_quote().is_some();

    Ok(TypeExpr {
        kind: TypeExprKind::Array {
            elem: Box::new(single),
            cap,
            extensible,
        },
        span: stream.span_from(start),
    })
}

/// A base type token or a (possibly dotted) type reference.
fn parse_single_type(stream: &mut TokenStream) -> Result<TypeExpr, ParseError> {
    let span = stream.current_span();
    let kind = match stream.peek() {
        Some(Token::Bool) => {
            stream.advance();
            TypeExprKind::Bool
        }
        Some(Token::Byte) => {
            stream.advance();
            TypeExprKind::Byte
        }
        Some(Token::Uint(nbits)) => {
            let nbits = *nbits;
            stream.advance();
            TypeExprKind::Uint(nbits)
        }
        Some(Token::Int(nbits)) => {
            let nbits = *nbits;
            stream.advance();
            TypeExprKind::Int(nbits)
        }
        Some(Token::Ident(_)) => {
            let start = stream.current_pos();
            let path = parse_path(stream, "as type reference")?;
            return Ok(TypeExpr {
                kind: TypeExprKind::Reference(path),
                span: stream.span_from(start),
            });
        }
        found => {
            return Err(ParseError::unexpected(
                found,
                "where a type was expected",
                stream.current_span(),
            ))
        }
    };
    Ok(TypeExpr { kind, span })
}

/// `ident ('.' ident)*`
pub fn parse_path(stream: &mut TokenStream, context: &str) -> Result<Path, ParseError> {
    let (head, _) = super::expect_ident(stream, context)?;
    let mut segments = vec![head];
    while stream.check(&Token::Dot) {
        stream.advance();
        let (segment, _) = super::expect_ident(stream, "after '.'")?;
        segments.push(segment);
    }
    Ok(Path::new(segments))
}

/// Parses a constant expression.
///
/// Grammar: literals, constant references, `+ - * /` with the usual
/// precedence, and parenthesized groups. Evaluation happens during
/// resolution, not here.
pub fn parse_const_expr(stream: &mut TokenStream) -> Result<ConstExpr, ParseError> {
    parse_sum(stream)
}

fn parse_sum(stream: &mut TokenStream) -> Result<ConstExpr, ParseError> {
    let start = stream.current_pos();
    let mut lhs = parse_product(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Plus) => BinOp::Add,
            Some(Token::Minus) => BinOp::Sub,
            _ => break,
        };
        stream.advance();
        let rhs = parse_product(stream)?;
        lhs = ConstExpr {
            kind: ConstExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span: stream.span_from(start),
        };
    }
    Ok(lhs)
}

fn parse_product(stream: &mut TokenStream) -> Result<ConstExpr, ParseError> {
    let start = stream.current_pos();
    let mut lhs = parse_atom(stream)?;
    loop {
        let op = match stream.peek() {
            Some(Token::Star) => BinOp::Mul,
            Some(Token::Slash) => BinOp::Div,
            _ => break,
        };
        stream.advance();
        let rhs = parse_atom(stream)?;
        lhs = ConstExpr {
            kind: ConstExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span: stream.span_from(start),
        };
    }
    Ok(lhs)
}

fn parse_atom(stream: &mut TokenStream) -> Result<ConstExpr, ParseError> {
    let span = stream.current_span();
    match stream.peek() {
        Some(Token::IntLiteral(value)) => {
            let value = *value;
            stream.advance();
            Ok(ConstExpr {
                kind: ConstExprKind::Int(value),
                span,
            })
        }
        Some(Token::BoolLiteral(value)) => {
            let value = *value;
            stream.advance();
            Ok(ConstExpr {
                kind: ConstExprKind::Bool(value),
                span,
            })
        }
        Some(Token::StrLiteral(value)) => {
            let value = value.clone();
            stream.advance();
            Ok(ConstExpr {
                kind: ConstExprKind::Str(value),
                span,
            })
        }
        Some(Token::Ident(_)) => {
            let start = stream.current_pos();
            let path = parse_path(stream, "as constant reference")?;
            Ok(ConstExpr {
                kind: ConstExprKind::Reference(path),
                span: stream.span_from(start),
            })
        }
        Some(Token::LParen) => {
            stream.advance();
            let inner = parse_const_expr(stream)?;
            stream.expect(Token::RParen)?;
            Ok(inner)
        }
        found => Err(ParseError::unexpected(
            found,
            "in constant expression",
            stream.current_span(),
        )),
    }
}
