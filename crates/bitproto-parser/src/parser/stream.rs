//! Token stream wrapper for the hand-written parser.

use bitproto_ast::foundation::Span;
use bitproto_lexer::Token;
use std::ops::Range;

/// Token stream with lookahead and span tracking.
///
/// Tokens are paired with their byte ranges in the source file, so every
/// parsed node and every error can carry an accurate [`Span`].
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    pos: usize,
    file_id: u16,
}

impl<'src> TokenStream<'src> {
    pub fn new(tokens: &'src [(Token, Range<usize>)], file_id: u16) -> Self {
        Self {
            tokens,
            pos: 0,
            file_id,
        }
    }

    /// Current token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token has the same discriminant as `expected`.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume `expected` or fail with an "expected token" error.
    pub fn expect(&mut self, expected: Token) -> Result<Span, super::ParseError> {
        if self.check(&expected) {
            let start = self.pos;
            self.advance();
            Ok(self.span_from(start))
        } else {
            Err(super::ParseError::expected_token(
                expected,
                self.peek().cloned(),
                self.current_span(),
            ))
        }
    }

    /// Consume a `;` if one is present. Semicolons are optional terminators.
    pub fn eat_semicolon(&mut self) {
        if matches!(self.peek(), Some(Token::Semicolon)) {
            self.advance();
        }
    }

    /// Consume a `'` if present, returning its span.
    pub fn eat_quote(&mut self) -> Option<Span> {
        if matches!(self.peek(), Some(Token::Quote)) {
            let span = self.current_span();
            self.advance();
            Some(span)
        } else {
            None
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Span covering tokens from position `start` up to the last consumed
    /// token.
    pub fn span_from(&self, start: usize) -> Span {
        let start_byte = match self.tokens.get(start) {
            Some((_, range)) => range.start,
            None => return self.current_span(),
        };
        let end_byte = if self.pos > 0 && self.pos <= self.tokens.len() {
            self.tokens[self.pos - 1].1.end
        } else {
            start_byte
        };
        Span::new(self.file_id, start_byte as u32, end_byte as u32)
    }

    /// Span of the current token, or a zero-length span at EOF.
    pub fn current_span(&self) -> Span {
        if let Some((_, range)) = self.tokens.get(self.pos) {
            Span::new(self.file_id, range.start as u32, range.end as u32)
        } else if let Some((_, range)) = self.tokens.last() {
            Span::new(self.file_id, range.end as u32, range.end as u32)
        } else {
            Span::zero(self.file_id)
        }
    }

    /// Skip tokens until the next declaration keyword, for error recovery.
    pub fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek() {
                Some(Token::Proto)
                | Some(Token::Import)
                | Some(Token::Option)
                | Some(Token::Const)
                | Some(Token::Type)
                | Some(Token::Typedef)
                | Some(Token::Enum)
                | Some(Token::Message) => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub fn file_id(&self) -> u16 {
        self.file_id
    }
}
