//! Declaration parsing: imports, options, constants, aliases, enums,
//! messages and fields.

use super::types::{parse_const_expr, parse_path, parse_type_expr};
use super::{expect_ident, expect_int_literal, ParseError, TokenStream};
use bitproto_ast::ast::{
    AliasDecl, ConstDecl, EnumDecl, EnumMemberDecl, FieldDecl, ImportDecl, MessageDecl,
    MessageItem, OptionDecl,
};
use bitproto_lexer::Token;

/// `import [alias] "path" [;]`
pub fn parse_import(stream: &mut TokenStream) -> Result<ImportDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Import)?;

    let alias = match stream.peek() {
        Some(Token::Ident(name)) => {
            let name = name.clone();
            stream.advance();
            Some(name)
        }
        _ => None,
    };

    let path = match stream.peek() {
        Some(Token::StrLiteral(path)) => {
            let path = path.clone();
            stream.advance();
            path
        }
        found => {
            return Err(ParseError::unexpected(
                found,
                "in import, expected a quoted file path",
                stream.current_span(),
            ))
        }
    };

    stream.eat_semicolon();
    Ok(ImportDecl {
        alias,
        path,
        span: stream.span_from(start),
    })
}

/// `option dotted.name = value [;]`
pub fn parse_option(stream: &mut TokenStream) -> Result<OptionDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Option)?;
    let name = parse_path(stream, "after 'option'")?;
    stream.expect(Token::Eq)?;
    let value = parse_const_expr(stream)?;
    stream.eat_semicolon();
    Ok(OptionDecl {
        name: name.to_string(),
        value,
        span: stream.span_from(start),
    })
}

/// `const NAME = expr [;]`
pub fn parse_const(stream: &mut TokenStream) -> Result<ConstDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Const)?;
    let (name, _) = expect_ident(stream, "after 'const'")?;
    stream.expect(Token::Eq)?;
    let value = parse_const_expr(stream)?;
    stream.eat_semicolon();
    Ok(ConstDecl {
        name,
        value,
        span: stream.span_from(start),
    })
}

/// `type Name = <type> [;]`, or the deprecated `typedef <type> Name [;]`.
pub fn parse_alias(stream: &mut TokenStream) -> Result<AliasDecl, ParseError> {
    let start = stream.current_pos();
    if stream.check(&Token::Typedef) {
        stream.advance();
        let target = parse_type_expr(stream)?;
        let (name, _) = expect_ident(stream, "in typedef, after the type")?;
        stream.eat_semicolon();
        return Ok(AliasDecl {
            name,
            target,
            legacy_syntax: true,
            span: stream.span_from(start),
        });
    }

    stream.expect(Token::Type)?;
    let (name, _) = expect_ident(stream, "after 'type'")?;
    stream.expect(Token::Eq)?;
    let target = parse_type_expr(stream)?;
    stream.eat_semicolon();
    Ok(AliasDecl {
        name,
        target,
        legacy_syntax: false,
        span: stream.span_from(start),
    })
}

/// `enum Name : uintN { MEMBER = value ... }`
pub fn parse_enum(stream: &mut TokenStream) -> Result<EnumDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Enum)?;
    let (name, _) = expect_ident(stream, "after 'enum'")?;
    stream.expect(Token::Colon)?;

    let backing_nbits = match stream.peek() {
        Some(Token::Uint(nbits)) => {
            let nbits = *nbits;
            stream.advance();
            nbits
        }
        found => {
            return Err(ParseError::unexpected(
                found,
                "as enum backing type, expected an unsigned integer type",
                stream.current_span(),
            ))
        }
    };

    // Enums cannot be extensible; keep the marker's span so analysis can
    // point at it.
    let extensible_marker = stream.eat_quote();

    stream.expect(Token::LBrace)?;
    let mut members = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(Token::Semicolon) => {
                stream.advance();
            }
            Some(Token::Ident(_)) => {
                let member_start = stream.current_pos();
                let (member_name, _) = expect_ident(stream, "as enum member name")?;
                stream.expect(Token::Eq)?;
                let (value, _) = expect_int_literal(stream, "as enum member value")?;
                stream.eat_semicolon();
                members.push(EnumMemberDecl {
                    name: member_name,
                    value,
                    span: stream.span_from(member_start),
                });
            }
            found => {
                return Err(ParseError::unexpected(
                    found,
                    "inside enum body, only 'NAME = value' members are allowed",
                    stream.current_span(),
                ))
            }
        }
    }
    stream.expect(Token::RBrace)?;

    Ok(EnumDecl {
        name,
        backing_nbits,
        members,
        extensible_marker,
        span: stream.span_from(start),
    })
}

/// `message Name ['] { <items> }`
pub fn parse_message(stream: &mut TokenStream) -> Result<MessageDecl, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Message)?;
    let (name, _) = expect_ident(stream, "after 'message'")?;
    let extensible = stream.eat_quote().is_some();
    stream.expect(Token::LBrace)?;

    let mut items = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(Token::Semicolon) => {
                stream.advance();
            }
            Some(Token::Option) => items.push(MessageItem::Option(parse_option(stream)?)),
            Some(Token::Const) => items.push(MessageItem::Const(parse_const(stream)?)),
            Some(Token::Typedef) => items.push(MessageItem::Alias(parse_alias(stream)?)),
            Some(Token::Type) => items.push(MessageItem::Alias(parse_alias(stream)?)),
            Some(Token::Enum) => items.push(MessageItem::Enum(parse_enum(stream)?)),
            Some(Token::Message) => items.push(MessageItem::Message(parse_message(stream)?)),
            Some(_) => items.push(MessageItem::Field(parse_field(stream)?)),
            None => {
                return Err(ParseError::unexpected(
                    None,
                    "inside message body, missing closing '}'",
                    stream.current_span(),
                ))
            }
        }
    }
    stream.expect(Token::RBrace)?;

    Ok(MessageDecl {
        name,
        extensible,
        items,
        span: stream.span_from(start),
    })
}

/// `<type> name = number [;]`
fn parse_field(stream: &mut TokenStream) -> Result<FieldDecl, ParseError> {
    let start = stream.current_pos();
    let ty = parse_type_expr(stream)?;
    let name = expect_field_name(stream)?;
    stream.expect(Token::Eq)?;
    let (number, _) = expect_int_literal(stream, "as field number")?;
    stream.eat_semicolon();
    Ok(FieldDecl {
        name,
        ty,
        number,
        span: stream.span_from(start),
    })
}

/// A field name is an identifier, or the keyword `type`, which the language
/// permits as a field name.
fn expect_field_name(stream: &mut TokenStream) -> Result<String, ParseError> {
    match stream.peek() {
        Some(Token::Ident(name)) => {
            let name = name.clone();
            stream.advance();
            Ok(name)
        }
        Some(Token::Type) => {
            stream.advance();
            Ok("type".to_string())
        }
        found => Err(ParseError::unexpected(
            found,
            "as field name, expected an identifier",
            stream.current_span(),
        )),
    }
}
