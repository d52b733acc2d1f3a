// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for the bitproto schema language.
//!
//! Tokenization is driven by logos. Whitespace and `//` comments are
//! skipped; everything else becomes a [`Token`]. Numeric type tokens
//! (`uint13`, `int24`) capture their declared width here and are
//! range-checked during semantic analysis, so `uint0` or `uint65` fail with
//! a width diagnostic instead of lexing as identifiers.
//!
//! # Examples
//!
//! ```
//! use bitproto_lexer::Token;
//! use logos::Logos;
//!
//! let tokens: Vec<_> = Token::lexer("uint3 status = 2").collect();
//! assert_eq!(tokens.len(), 4);
//! ```

use logos::Logos;
use std::fmt;

/// A bitproto token.
///
/// The reserved words `render`, `template`, `for` and `on` lex as keywords
/// even though no grammar production accepts them; using one as a name is a
/// syntax error at the parser.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum Token {
    // === Keywords ===
    /// Keyword `proto`
    #[token("proto")]
    Proto,
    /// Keyword `import`
    #[token("import")]
    Import,
    /// Keyword `const`
    #[token("const")]
    Const,
    /// Keyword `option`
    #[token("option")]
    Option,
    /// Keyword `enum`
    #[token("enum")]
    Enum,
    /// Keyword `message`
    #[token("message")]
    Message,
    /// Keyword `type`
    #[token("type")]
    Type,
    /// Deprecated keyword `typedef`; accepted with a lint warning.
    #[token("typedef")]
    Typedef,
    /// Reserved keyword `render`
    #[token("render")]
    Render,
    /// Reserved keyword `template`
    #[token("template")]
    Template,
    /// Reserved keyword `for`
    #[token("for")]
    For,
    /// Reserved keyword `on`
    #[token("on")]
    On,

    // === Type tokens ===
    /// Type `bool`
    #[token("bool")]
    Bool,
    /// Type `byte`
    #[token("byte")]
    Byte,
    /// Type `uint<N>` with its declared width.
    ///
    /// Any digit run is captured so that widths outside 1..=64 reach
    /// analysis and produce a width error there.
    #[regex(r"uint[0-9]+", |lex| lex.slice()[4..].parse::<u32>().ok())]
    Uint(u32),
    /// Type `int<N>` with its declared width.
    #[regex(r"int[0-9]+", |lex| lex.slice()[3..].parse::<u32>().ok())]
    Int(u32),

    // === Literals ===
    /// Boolean literal; `yes` and `no` are aliases for `true` and `false`.
    #[token("true", |_| true)]
    #[token("yes", |_| true)]
    #[token("false", |_| false)]
    #[token("no", |_| false)]
    BoolLiteral(bool),
    /// Integer literal, decimal or hex.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    IntLiteral(u64),
    /// Double-quoted string literal, unescaped.
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    StrLiteral(String),
    /// Identifier.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Punctuation ===
    /// `=`
    #[token("=")]
    Eq,
    /// `:`
    #[token(":")]
    Colon,
    /// `;` (optional statement terminator)
    #[token(";")]
    Semicolon,
    /// `.`
    #[token(".")]
    Dot,
    /// `'` (extensible marker)
    #[token("'")]
    Quote,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
}

/// Unescape the content of a string literal.
///
/// Supported escapes match the language: `\t \r \n \\ \' \"`. Returns
/// `None` on any other escape, which surfaces as a lexical error.
fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            _ => return None,
        }
    }
    Some(out)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Proto => write!(f, "proto"),
            Token::Import => write!(f, "import"),
            Token::Const => write!(f, "const"),
            Token::Option => write!(f, "option"),
            Token::Enum => write!(f, "enum"),
            Token::Message => write!(f, "message"),
            Token::Type => write!(f, "type"),
            Token::Typedef => write!(f, "typedef"),
            Token::Render => write!(f, "render"),
            Token::Template => write!(f, "template"),
            Token::For => write!(f, "for"),
            Token::On => write!(f, "on"),
            Token::Bool => write!(f, "bool"),
            Token::Byte => write!(f, "byte"),
            Token::Uint(n) => write!(f, "uint{}", n),
            Token::Int(n) => write!(f, "int{}", n),
            Token::BoolLiteral(v) => write!(f, "{}", v),
            Token::IntLiteral(v) => write!(f, "{}", v),
            Token::StrLiteral(s) => write!(f, "\"{}\"", s),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Eq => write!(f, "="),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Quote => write!(f, "'"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test helper: lex source, panicking on invalid tokens.
    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source)
            .collect::<Result<Vec<_>, _>>()
            .expect("lexing failed")
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_keywords() {
        let tokens = lex("proto import const option enum message type");
        assert_eq!(
            tokens,
            vec![
                Token::Proto,
                Token::Import,
                Token::Const,
                Token::Option,
                Token::Enum,
                Token::Message,
                Token::Type,
            ]
        );
    }

    #[test]
    fn test_reserved_keywords() {
        let tokens = lex("render template for on");
        assert_eq!(
            tokens,
            vec![Token::Render, Token::Template, Token::For, Token::On]
        );
    }

    #[test]
    fn test_type_tokens() {
        let tokens = lex("bool byte uint3 int24 uint64");
        assert_eq!(
            tokens,
            vec![
                Token::Bool,
                Token::Byte,
                Token::Uint(3),
                Token::Int(24),
                Token::Uint(64),
            ]
        );
    }

    #[test]
    fn test_out_of_range_width_still_lexes() {
        // Width validation is analysis' job; the token must not degrade
        // into an identifier.
        assert_eq!(lex("uint65"), vec![Token::Uint(65)]);
        assert_eq!(lex("int0"), vec![Token::Int(0)]);
    }

    #[test]
    fn test_bool_literals_and_aliases() {
        let tokens = lex("true yes false no");
        assert_eq!(
            tokens,
            vec![
                Token::BoolLiteral(true),
                Token::BoolLiteral(true),
                Token::BoolLiteral(false),
                Token::BoolLiteral(false),
            ]
        );
    }

    #[test]
    fn test_int_literals() {
        let tokens = lex("0 42 0xFF 0x1f");
        assert_eq!(
            tokens,
            vec![
                Token::IntLiteral(0),
                Token::IntLiteral(42),
                Token::IntLiteral(0xFF),
                Token::IntLiteral(0x1F),
            ]
        );
    }

    #[test]
    fn test_string_literal_escapes() {
        let tokens = lex(r#""plain" "a\tb" "q\"q""#);
        assert_eq!(
            tokens,
            vec![
                Token::StrLiteral("plain".to_string()),
                Token::StrLiteral("a\tb".to_string()),
                Token::StrLiteral("q\"q".to_string()),
            ]
        );
    }

    #[test]
    fn test_bad_escape_is_error() {
        let results: Vec<_> = Token::lexer(r#""a\qb""#).collect();
        assert!(results[0].is_err());
    }

    #[test]
    fn test_identifiers() {
        let tokens = lex("Drone my_field _x uint_like");
        assert_eq!(
            tokens,
            vec![
                ident("Drone"),
                ident("my_field"),
                ident("_x"),
                ident("uint_like"),
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = lex("proto // the drone protocol\ndrone");
        assert_eq!(tokens, vec![Token::Proto, ident("drone")]);
    }

    #[test]
    fn test_field_declaration() {
        let tokens = lex("uint3 status = 2;");
        assert_eq!(
            tokens,
            vec![
                Token::Uint(3),
                ident("status"),
                Token::Eq,
                Token::IntLiteral(2),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_array_with_extensible_marker() {
        let tokens = lex("byte[8]'");
        assert_eq!(
            tokens,
            vec![
                Token::Byte,
                Token::LBracket,
                Token::IntLiteral(8),
                Token::RBracket,
                Token::Quote,
            ]
        );
    }

    #[test]
    fn test_dotted_reference() {
        let tokens = lex("shared.Timestamp");
        assert_eq!(
            tokens,
            vec![ident("shared"), Token::Dot, ident("Timestamp")]
        );
    }

    #[test]
    fn test_const_expression() {
        let tokens = lex("const N = (3 + 1) * 2 / 4 - 1");
        assert_eq!(
            tokens,
            vec![
                Token::Const,
                ident("N"),
                Token::Eq,
                Token::LParen,
                Token::IntLiteral(3),
                Token::Plus,
                Token::IntLiteral(1),
                Token::RParen,
                Token::Star,
                Token::IntLiteral(2),
                Token::Slash,
                Token::IntLiteral(4),
                Token::Minus,
                Token::IntLiteral(1),
            ]
        );
    }

    #[test]
    fn test_invalid_character() {
        let results: Vec<_> = Token::lexer("message @ Drone").collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Token::Message.to_string(), "message");
        assert_eq!(Token::Uint(13).to_string(), "uint13");
        assert_eq!(Token::Quote.to_string(), "'");
        assert_eq!(Token::StrLiteral("x".into()).to_string(), "\"x\"");
    }
}
