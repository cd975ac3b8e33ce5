use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Largest value a Jack integer constant may carry. Negative values are
/// produced by the unary `-` operator, never by the literal itself.
pub const MAX_INT_CONSTANT: u32 = 32767;

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if ch == b'"' {
                return self.scan_string();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol returned None → error was recorded, try again
        }
    }

    /// Skip whitespace, `//` line comments, and `/* ... */` block comments
    /// (which includes the `/** ... */ ` doc form). Block comments may span
    /// lines and do not nest.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'*'
            {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.source.len() {
                        self.diagnostics.push(
                            Diagnostic::error(
                                "unterminated block comment".to_string(),
                                Span::new(start as u32, self.source.len() as u32),
                            )
                            .with_help(
                                "every `/*` must be closed by a matching `*/`".to_string(),
                            ),
                        );
                        self.pos = self.source.len();
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.source[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    /// Scan a string constant. Internal whitespace is retained verbatim.
    fn scan_string(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        self.pos += 1; // skip opening '"'
        let body_start = self.pos;

        while self.pos < self.source.len() && self.source[self.pos] != b'"' {
            self.pos += 1;
        }

        let text = std::str::from_utf8(&self.source[body_start..self.pos])
            .unwrap_or_default()
            .to_string();

        if self.pos >= self.source.len() {
            self.diagnostics.push(
                Diagnostic::error(
                    "unterminated string literal".to_string(),
                    Span::new(start as u32, self.pos as u32),
                )
                .with_help("add a closing '\"' before the end of the file".to_string()),
            );
        } else {
            self.pos += 1; // skip closing '"'
        }

        self.make_token(Lexeme::StrConst(text), start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        match text.parse::<u32>() {
            Ok(n) if n <= MAX_INT_CONSTANT => {
                self.make_token(Lexeme::IntConst(n as u16), start, self.pos)
            }
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("integer constant '{}' is out of range", text),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(format!(
                        "Jack integer constants must lie in 0..={}",
                        MAX_INT_CONSTANT
                    )),
                );
                self.make_token(Lexeme::IntConst(0), start, self.pos)
            }
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let token = Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'{' => Lexeme::LBrace,
            b'}' => Lexeme::RBrace,
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'[' => Lexeme::LBracket,
            b']' => Lexeme::RBracket,
            b'.' => Lexeme::Dot,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'+' => Lexeme::Plus,
            b'-' => Lexeme::Minus,
            b'*' => Lexeme::Star,
            b'/' => Lexeme::Slash,
            b'&' => Lexeme::Amp,
            b'|' => Lexeme::Pipe,
            b'<' => Lexeme::Lt,
            b'>' => Lexeme::Gt,
            b'=' => Lexeme::Eq,
            b'~' => Lexeme::Tilde,
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unexpected character '{}' (U+{:04X})", ch as char, ch),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help("this character is not part of Jack syntax".to_string()),
                );
                return None;
            }
        };

        Some(self.make_token(token, start, self.pos))
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
