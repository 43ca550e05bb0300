//! Position-tracking scanner (§4.1). Produces tokens on demand with a
//! look-ahead of one, the way the parser pulls lazily from it (§4.2).

use super::tokens::{is_keyword, Token, TokenKind, SYMBOLS};
use crate::compiler_messages::{CompilerError, ErrorType};
use crate::position::{Position, SourceSpan};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

pub struct Lexer<'a> {
    file: PathBuf,
    chars: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl AsRef<Path>) -> Self {
        Lexer {
            file: file.as_ref().to_path_buf(),
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn span(&self, msg: impl Into<String>, pos: Position) -> CompilerError {
        CompilerError::new(ErrorType::Syntax, msg, SourceSpan::new(self.file.clone(), pos))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.clone().nth(offset)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Scans and returns the next token. Returns an `Eof` token forever once
    /// the source is exhausted, so callers can peek past the end safely.
    pub fn next_token(&mut self) -> Result<Token, CompilerError> {
        self.skip_whitespace();

        let start = Position::at(self.line, self.col);
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        if is_ident_start(c) {
            return Ok(self.scan_identifier(start));
        }
        if c.is_ascii_digit() {
            return self.scan_number(start);
        }
        if c == '"' {
            return self.scan_string(start);
        }
        self.scan_symbol(start)
    }

    fn scan_identifier(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let end = Position::at(self.line, self.col.saturating_sub(1).max(1));
        let kind = if is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, start.merge(end))
    }

    fn scan_number(&mut self, start: Position) -> Result<Token, CompilerError> {
        let mut lexeme = String::new();

        // 0x / 0o / 0b prefixed integers.
        if self.peek() == Some('0') {
            if let Some(next) = self.peek_at(1) {
                if matches!(next, 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
                    lexeme.push(self.bump().unwrap());
                    lexeme.push(self.bump().unwrap());
                    while let Some(c) = self.peek() {
                        if c.is_alphanumeric() {
                            lexeme.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let end = Position::at(self.line, self.col.saturating_sub(1).max(1));
                    return Ok(Token::new(TokenKind::Integer, lexeme, start.merge(end)));
                }
            }
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let mut is_float = false;

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            lexeme.push(self.bump().unwrap()); // '.'
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                lexeme.push(self.bump().unwrap()); // 'e'
                if matches!(self.peek(), Some('+') | Some('-')) {
                    lexeme.push(self.bump().unwrap());
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        lexeme.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        let end = Position::at(self.line, self.col.saturating_sub(1).max(1));
        let span = start.merge(end);
        let kind = if is_float {
            TokenKind::Floating
        } else {
            TokenKind::Integer
        };
        Ok(Token::new(kind, lexeme, span))
    }

    fn scan_string(&mut self, start: Position) -> Result<Token, CompilerError> {
        self.bump(); // opening quote
        let mut lexeme = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(self.span(
                        "unterminated string literal",
                        start.merge(Position::at(self.line, self.col)),
                    ))
                }
                Some('\n') => {
                    return Err(self.span(
                        "newline in string literal before closing quote",
                        start.merge(Position::at(self.line, self.col)),
                    ))
                }
                Some('"') => break,
                Some('\\') => {
                    let escaped = self.bump().ok_or_else(|| {
                        self.span("unterminated escape sequence", Position::at(self.line, self.col))
                    })?;
                    let resolved = match escaped {
                        'b' => '\u{8}',
                        'f' => '\u{C}',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        other => {
                            return Err(self.span(
                                format!("unknown escape sequence '\\{other}'"),
                                Position::at(self.line, self.col),
                            ))
                        }
                    };
                    lexeme.push(resolved);
                }
                Some(c) => lexeme.push(c),
            }
        }
        let end = Position::at(self.line, self.col.saturating_sub(1).max(1));
        Ok(Token::new(TokenKind::StringLit, lexeme, start.merge(end)))
    }

    fn scan_symbol(&mut self, start: Position) -> Result<Token, CompilerError> {
        for &candidate in SYMBOLS {
            if self.matches_ahead(candidate) {
                for _ in 0..candidate.chars().count() {
                    self.bump();
                }
                let end = Position::at(self.line, self.col.saturating_sub(1).max(1));
                return Ok(Token::new(TokenKind::Symbol, candidate, start.merge(end)));
            }
        }
        let c = self.bump().unwrap();
        Err(self.span(format!("unexpected character '{c}'"), start))
    }

    fn matches_ahead(&self, candidate: &str) -> bool {
        candidate
            .chars()
            .enumerate()
            .all(|(i, ch)| self.peek_at(i) == Some(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src, "test.juno");
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    #[test]
    fn keywords_are_tagged_as_keywords() {
        let tokens = lex_all("function main");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn numeric_forms() {
        let tokens = lex_all("42 0x1A 3.14 1e10 1.5e-3");
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Integer);
        assert_eq!(tokens[2].kind, TokenKind::Floating);
        assert_eq!(tokens[3].kind, TokenKind::Floating);
        assert_eq!(tokens[4].kind, TokenKind::Floating);
    }

    #[test]
    fn string_escapes() {
        let tokens = lex_all(r#""hello\nworld""#);
        assert_eq!(tokens[0].lexeme, "hello\nworld");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc\ndef\"", "test.juno");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn maximal_munch_prefers_longer_operators() {
        let tokens = lex_all("a <<= b");
        assert_eq!(tokens[1].lexeme, "<<=");
    }

    #[test]
    fn positions_are_weakly_monotonic() {
        let tokens = lex_all("var x i32 = 1;\nvar y i32 = 2;");
        let mut last_start = (0u32, 0u32);
        for tok in &tokens {
            let start = (tok.position.start_line, tok.position.start_col);
            assert!(start >= last_start);
            last_start = start;
        }
    }
}
