//! Character stream to token stream, with single-token lookahead.
//!
//! Mirrors spec.md §4.3: the lexer never halts on an unexpected character,
//! it reports and skips. Comments and whitespace never surface as tokens.

use crate::diagnostics::{Category, Diagnostics, Severity};
use crate::token::{KEYWORDS, Token, TokenKind};

/// Greedy-matched multi-character operators, longest first so that e.g.
/// `==` is preferred over `=`.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "+=", "-=", "*=", "/=", "+", "-",
    "*", "/", "%", "<", ">", "&", "|", "^", "~", "!", "=",
];

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    current_line: usize,
    /// `None` until the first call to `advance`.
    current_token: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            current_line: 1,
            current_token: None,
        }
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn current(&self) -> Option<&Token> {
        self.current_token.as_ref()
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.current_line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Advance to the next token, returning it by value and also storing it
    /// as `current()`. Idempotent at `EOF`.
    pub fn advance(&mut self, diagnostics: &mut Diagnostics) -> Token {
        self.skip_trivia();

        let line = self.current_line;
        let tok = match self.peek() {
            None => Token::eof(line),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.lex_ident_or_keyword(line),
            Some(c) if c.is_ascii_digit() => self.lex_number(line),
            Some(b'"') => self.lex_string(line),
            Some(b'(') => self.single(TokenKind::LParen, line),
            Some(b')') => self.single(TokenKind::RParen, line),
            Some(b'{') => self.single(TokenKind::LBrace, line),
            Some(b'}') => self.single(TokenKind::RBrace, line),
            Some(b'[') => self.single(TokenKind::LBracket, line),
            Some(b']') => self.single(TokenKind::RBracket, line),
            Some(b',') => self.single(TokenKind::Comma, line),
            Some(b';') => self.single(TokenKind::Semicolon, line),
            Some(b'.') => self.single(TokenKind::Dot, line),
            Some(_) => self.lex_operator_or_error(line, diagnostics),
        };

        self.current_token = Some(tok.clone());
        tok
    }

    fn single(&mut self, kind: TokenKind, line: usize) -> Token {
        let c = self.bump().unwrap();
        Token::new(kind, (c as char).to_string(), line)
    }

    fn lex_ident_or_keyword(&mut self, line: usize) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap()
            .to_string();
        let kind = if KEYWORDS.contains(&text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, line)
    }

    fn lex_number(&mut self, line: usize) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap()
            .to_string();
        Token::new(TokenKind::Number, text, line)
    }

    fn lex_string(&mut self, line: usize) -> Token {
        let start = self.pos;
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None => break,
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap()
            .to_string();
        Token::new(TokenKind::String, text, line)
    }

    fn lex_operator_or_error(&mut self, line: usize, diagnostics: &mut Diagnostics) -> Token {
        let remaining = std::str::from_utf8(&self.source[self.pos..]).unwrap_or("");
        for op in OPERATORS {
            if remaining.starts_with(op) {
                self.pos += op.len();
                return Token::new(TokenKind::Operator, *op, line);
            }
        }

        let bad = self.bump().unwrap();
        diagnostics.log_error(
            Category::Lexer,
            line,
            &format!("unexpected character '{}'", bad as char),
        );
        // Recover: keep lexing after the bad byte rather than halting.
        self.advance(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> (Vec<Token>, Diagnostics) {
        let mut lexer = Lexer::new(src);
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        loop {
            let tok = lexer.advance(&mut diags);
            let done = tok.is(TokenKind::Eof);
            out.push(tok);
            if done {
                break;
            }
        }
        (out, diags)
    }

    #[test]
    fn s1_tokenize() {
        let (toks, _) = tokens("int x = a + 42; // c\nif (x==43) x = x-1;");
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].lexeme, "int");
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].lexeme, "x");
        assert_eq!(toks[2].kind, TokenKind::Operator);
        assert_eq!(toks[2].lexeme, "=");
        assert_eq!(toks[3].kind, TokenKind::Identifier);
        assert_eq!(toks[3].lexeme, "a");
        assert_eq!(toks[4].kind, TokenKind::Operator);
        assert_eq!(toks[4].lexeme, "+");
        assert_eq!(toks[5].kind, TokenKind::Number);
        assert_eq!(toks[5].lexeme, "42");
        assert_eq!(toks[6].kind, TokenKind::Semicolon);

        assert!(toks.iter().any(|t| t.kind == TokenKind::Keyword && t.lexeme == "if"));
        assert!(toks.iter().any(|t| t.kind == TokenKind::Operator && t.lexeme == "=="));
    }

    #[test]
    fn greedy_operator_match() {
        let (toks, _) = tokens("a <<= b");
        assert_eq!(toks[1].lexeme, "<<=");
    }

    #[test]
    fn block_comment_spans_lines() {
        let (toks, _) = tokens("int /* spans\nlines */ x;");
        assert_eq!(toks[0].lexeme, "int");
        assert_eq!(toks[1].lexeme, "x");
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn unexpected_character_recovers() {
        let (toks, diags) = tokens("int x @ = 1;");
        assert!(diags.error_count() >= 1);
        assert!(toks.iter().any(|t| t.lexeme == "="));
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lexer = Lexer::new("");
        let mut diags = Diagnostics::new();
        let a = lexer.advance(&mut diags);
        let b = lexer.advance(&mut diags);
        assert_eq!(a.kind, TokenKind::Eof);
        assert_eq!(b.kind, TokenKind::Eof);
    }
}
