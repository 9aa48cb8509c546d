//! Lexer (tokenizer) for expression strings.

use crate::error::{MdoError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A dotted name (`aircraft.weight_cg.mtow`, `unit.kt_mps`, `sqrt`)
    Name,
    /// A floating point literal
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    /// `^` or `**`
    Caret,
    OpenParen,
    CloseParen,
    Comma,
    /// End of input
    Eof,
}

/// Lexer for tokenizing expression input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            column: 1,
        }
    }

    /// Tokenize the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }

        let column = self.column;
        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(Token { kind: TokenKind::Eof, text: String::new(), column }),
        };

        let single = |kind: TokenKind| Token { kind, text: ch.to_string(), column };

        let token = match ch {
            '+' => {
                self.advance();
                single(TokenKind::Plus)
            }
            '-' => {
                self.advance();
                single(TokenKind::Minus)
            }
            '*' => {
                self.advance();
                if self.chars.peek() == Some(&'*') {
                    self.advance();
                    Token { kind: TokenKind::Caret, text: "**".to_string(), column }
                } else {
                    single(TokenKind::Star)
                }
            }
            '/' => {
                self.advance();
                single(TokenKind::Slash)
            }
            '^' => {
                self.advance();
                single(TokenKind::Caret)
            }
            '(' => {
                self.advance();
                single(TokenKind::OpenParen)
            }
            ')' => {
                self.advance();
                single(TokenKind::CloseParen)
            }
            ',' => {
                self.advance();
                single(TokenKind::Comma)
            }
            '0'..='9' | '.' => Token {
                kind: TokenKind::Number,
                text: self.read_number(column)?,
                column,
            },
            _ if ch.is_alphabetic() || ch == '_' => Token {
                kind: TokenKind::Name,
                text: self.read_name(column)?,
                column,
            },
            _ => {
                return Err(MdoError::syntax(
                    column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch.is_some() {
            self.column += 1;
        }
        ch
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, column: usize) -> Result<String> {
        let mut text = String::new();

        // Integer part, then optional fraction ("100." is allowed)
        self.read_digits(&mut text);
        if self.chars.peek() == Some(&'.') {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent part
        if let Some(&ch) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                text.push(ch);
                self.advance();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '-' || sign == '+' {
                        text.push(sign);
                        self.advance();
                    }
                }
                self.read_digits(&mut text);
            }
        }

        if text.parse::<f64>().is_err() {
            return Err(MdoError::syntax(column, format!("invalid number '{}'", text)));
        }
        Ok(text)
    }

    fn read_name(&mut self, column: usize) -> Result<String> {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else if ch == '.' {
                text.push(ch);
                self.advance();
                match self.chars.peek() {
                    Some(&next) if next.is_alphabetic() || next == '_' => {}
                    _ => {
                        return Err(MdoError::syntax(
                            column,
                            format!("dangling '.' in name '{}'", text),
                        ));
                    }
                }
            } else {
                break;
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_dotted_names() {
        let tokens = Lexer::new("aircraft.weight_cg.mtow - 1").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Name);
        assert_eq!(tokens[0].text, "aircraft.weight_cg.mtow");
        assert_eq!(tokens[1].kind, TokenKind::Minus);
        assert_eq!(tokens[1].column, 25);
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("100. 1.5e-3 .25").tokenize().unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100.", "1.5e-3", ".25", ""]);
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a**2 ^ (b, c) / d * e"),
            vec![Name, Caret, Number, Caret, OpenParen, Name, Comma, Name, CloseParen, Slash, Name, Star, Name, Eof]
        );
    }

    #[test]
    fn test_rejects_strings_and_brackets() {
        assert!(Lexer::new("unit.convert_to('kg', x)").tokenize().is_err());
        assert!(Lexer::new("x[0]").tokenize().is_err());
        assert!(Lexer::new("aircraft.").tokenize().is_err());
    }
}
