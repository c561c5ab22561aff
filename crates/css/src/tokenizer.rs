//! Stylesheet Tokenizer
//!
//! Splits stylesheet text into tokens following the shape of CSS Syntax
//! Level 3. Every token carries the byte span it was read from so the parser
//! can hand raw source text (declaration values, pseudo-class arguments) to
//! later stages untouched.

use crate::error::{CssError, CssResult, SourceLocation};

/// Stylesheet token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g., property names, keywords, tag names)
    Ident(String),
    /// Function token (identifier followed by '(')
    Function(String),
    /// At-keyword (e.g., @import)
    AtKeyword(String),
    /// Hash token (e.g., #id, #fff)
    Hash(String, HashType),
    /// String token, quotes removed
    String(String),
    /// Unquoted url(...) contents
    Url(String),
    /// Number (without unit)
    Number(f64),
    /// Percentage
    Percentage(f64),
    /// Dimension (number with unit)
    Dimension(f64, String),
    /// Whitespace, including any comments inside the run
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    /// Any other single character
    Delim(char),
    /// End of input
    Eof,
}

/// Hash token type (id or unrestricted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// Could be an ID selector
    Id,
    /// Unrestricted (e.g., a color such as #0af)
    Unrestricted,
}

/// Byte range of a token in the tokenizer input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Rebuilds source text from token spans with comments left out. A run of
/// whitespace, or a comment between two tokens, becomes one space; leading
/// and trailing whitespace is dropped.
#[derive(Debug, Default)]
pub struct RawText {
    text: String,
    last_end: Option<usize>,
    pending_space: bool,
}

impl RawText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token read from `input`
    pub fn push(&mut self, input: &str, token: &Token, span: Span) {
        if *token == Token::Whitespace {
            self.pending_space = true;
        } else {
            if self.last_end.is_some_and(|end| span.start > end) {
                self.pending_space = true;
            }
            if self.pending_space && !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(&input[span.start..span.end]);
            self.pending_space = false;
        }
        self.last_end = Some(span.end);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// Stylesheet tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    /// Location of `input[0]` inside the enclosing document
    origin: SourceLocation,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over a whole document
    pub fn new(input: &'a str) -> Self {
        Self::with_origin(input, SourceLocation::start())
    }

    /// Create a tokenizer over a fragment that starts at `origin` in some
    /// larger document, so reported locations point into that document.
    pub fn with_origin(input: &'a str, origin: SourceLocation) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            origin,
        }
    }

    /// The text being tokenized
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset into the input
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the current source location
    pub fn location(&self) -> SourceLocation {
        let column = if self.line == 1 {
            self.origin.column + self.column - 1
        } else {
            self.column
        };
        SourceLocation::new(
            self.origin.line + self.line - 1,
            column,
            self.origin.offset + self.position,
        )
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.position..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    /// Consume whitespace and comments. Returns true if any whitespace was
    /// consumed; comments alone separate nothing.
    fn consume_trivia(&mut self) -> CssResult<bool> {
        let mut whitespace = false;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance_while(char::is_whitespace);
                    whitespace = true;
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let location = self.location();
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(CssError::UnterminatedComment { location }),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(whitespace)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CssResult<Token> {
        self.next_spanned().map(|(token, _)| token)
    }

    /// Get the next token together with the byte span it covers
    pub fn next_spanned(&mut self) -> CssResult<(Token, Span)> {
        let start = self.position;
        if self.consume_trivia()? {
            return Ok((Token::Whitespace, Span::new(start, self.position)));
        }

        // Skipped comments are not part of the token
        let start = self.position;
        let token = self.read_token()?;
        Ok((token, Span::new(start, self.position)))
    }

    fn read_token(&mut self) -> CssResult<Token> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let simple = match c {
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semicolon),
            ',' => Some(Token::Comma),
            '[' => Some(Token::LeftBracket),
            ']' => Some(Token::RightBracket),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '{' => Some(Token::LeftBrace),
            '}' => Some(Token::RightBrace),
            _ => None,
        };
        if let Some(token) = simple {
            self.advance();
            return Ok(token);
        }

        match c {
            '"' | '\'' => self.consume_string(),
            '#' => self.consume_hash(),
            '@' if self.peek_nth(1).map(is_ident_start).unwrap_or(false) => {
                self.advance();
                Ok(Token::AtKeyword(self.consume_name()))
            }
            _ if self.starts_number() => self.consume_numeric(),
            _ if self.starts_identifier() => self.consume_ident_like(),
            _ => {
                self.advance();
                Ok(Token::Delim(c))
            }
        }
    }

    fn starts_number(&self) -> bool {
        let digit = |c: Option<char>| c.map(|c| c.is_ascii_digit()).unwrap_or(false);
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => digit(self.peek_nth(1)),
            Some('+') | Some('-') => {
                digit(self.peek_nth(1)) || (self.peek_nth(1) == Some('.') && digit(self.peek_nth(2)))
            }
            _ => false,
        }
    }

    fn starts_identifier(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_nth(1) {
                Some(c) => is_ident_start(c) || c == '-',
                None => false,
            },
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn consume_string(&mut self) -> CssResult<Token> {
        let location = self.location();
        let quote = match self.advance() {
            Some(q) => q,
            None => return Err(CssError::unexpected_eof(location)),
        };
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Token::String(value)),
                Some('\\') => match self.advance() {
                    // Escaped newline is a line continuation
                    Some('\n') => {}
                    Some(c) => value.push(c),
                    None => return Err(CssError::UnterminatedString { location }),
                },
                Some('\n') | None => return Err(CssError::UnterminatedString { location }),
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_hash(&mut self) -> CssResult<Token> {
        self.advance(); // '#'
        let starts_ident = self.starts_identifier();
        let name = self.consume_name();

        if name.is_empty() {
            return Ok(Token::Delim('#'));
        }

        let hash_type = if starts_ident { HashType::Id } else { HashType::Unrestricted };
        Ok(Token::Hash(name, hash_type))
    }

    fn consume_name(&mut self) -> String {
        let start = self.position;
        self.advance_while(is_ident_char);
        self.input[start..self.position].to_string()
    }

    fn consume_ident_like(&mut self) -> CssResult<Token> {
        let name = self.consume_name();

        if self.peek() != Some('(') {
            return Ok(Token::Ident(name));
        }
        self.advance(); // '('

        if name.eq_ignore_ascii_case("url") {
            let save = (self.position, self.line, self.column);
            self.advance_while(char::is_whitespace);
            match self.peek() {
                Some('"') | Some('\'') => {
                    // Quoted url: let the parser read the string argument
                    (self.position, self.line, self.column) = save;
                }
                _ => return self.consume_url(),
            }
        }

        Ok(Token::Function(name))
    }

    fn consume_url(&mut self) -> CssResult<Token> {
        let location = self.location();
        let mut url = String::new();

        loop {
            match self.advance() {
                Some(')') => return Ok(Token::Url(url)),
                Some(c) if c.is_whitespace() => {
                    self.advance_while(char::is_whitespace);
                    if self.advance() == Some(')') {
                        return Ok(Token::Url(url));
                    }
                    return Err(CssError::parse_error("Invalid url()", location));
                }
                Some('\\') => {
                    if let Some(c) = self.advance() {
                        url.push(c);
                    }
                }
                Some('"') | Some('\'') | Some('(') => {
                    return Err(CssError::parse_error("Invalid character in url()", location));
                }
                Some(c) => url.push(c),
                None => return Err(CssError::parse_error("Unterminated url()", location)),
            }
        }
    }

    fn consume_numeric(&mut self) -> CssResult<Token> {
        let location = self.location();
        let start = self.position;

        if matches!(self.peek(), Some('+') | Some('-')) {
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_nth(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        // Exponent only when digits follow, otherwise 'e' starts a unit
        if matches!(self.peek(), Some('e') | Some('E')) {
            let has_digits = match self.peek_nth(1) {
                Some('+') | Some('-') => self.peek_nth(2).map(|c| c.is_ascii_digit()).unwrap_or(false),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                self.advance();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.input[start..self.position];
        let value: f64 = text.parse().map_err(|_| CssError::InvalidNumber {
            number: text.to_string(),
            location,
        })?;

        if self.peek() == Some('%') {
            self.advance();
            return Ok(Token::Percentage(value));
        }

        if self.starts_identifier() {
            let unit = self.consume_name();
            return Ok(Token::Dimension(value, unit));
        }

        Ok(Token::Number(value))
    }

    /// Tokenize all remaining input (whitespace included, Eof excluded)
    pub fn tokenize_all(&mut self) -> CssResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Check if character can start an identifier
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c > '\x7F'
}

/// Check if character can be part of an identifier
fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize_all().unwrap()
    }

    #[test]
    fn test_simple_rule() {
        let tokens = tokenize("Label { color: red; }");
        assert!(matches!(tokens[0], Token::Ident(ref s) if s == "Label"));
        assert!(matches!(tokens[2], Token::LeftBrace));
        assert!(matches!(tokens[4], Token::Ident(ref s) if s == "color"));
        assert!(matches!(tokens[5], Token::Colon));
        assert!(matches!(tokens[7], Token::Ident(ref s) if s == "red"));
        assert!(matches!(tokens[8], Token::Semicolon));
    }

    #[test]
    fn test_class_selector() {
        let tokens = tokenize(".nav-bar");
        assert!(matches!(tokens[0], Token::Delim('.')));
        assert!(matches!(tokens[1], Token::Ident(ref s) if s == "nav-bar"));
    }

    #[test]
    fn test_hash_types() {
        let tokens = tokenize("#main #0af");
        assert!(matches!(tokens[0], Token::Hash(ref s, HashType::Id) if s == "main"));
        assert!(matches!(tokens[2], Token::Hash(ref s, HashType::Unrestricted) if s == "0af"));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.5 50% 100px -10px 1e3");
        assert!(matches!(tokens[0], Token::Number(n) if (n - 42.0).abs() < 1e-9));
        assert!(matches!(tokens[2], Token::Number(n) if (n - 3.5).abs() < 1e-9));
        assert!(matches!(tokens[4], Token::Percentage(n) if (n - 50.0).abs() < 1e-9));
        assert!(matches!(tokens[6], Token::Dimension(n, ref u) if (n - 100.0).abs() < 1e-9 && u == "px"));
        assert!(matches!(tokens[8], Token::Dimension(n, ref u) if (n + 10.0).abs() < 1e-9 && u == "px"));
        assert!(matches!(tokens[10], Token::Number(n) if (n - 1000.0).abs() < 1e-9));
    }

    #[test]
    fn test_em_unit_is_not_exponent() {
        let tokens = tokenize("2em");
        assert!(matches!(tokens[0], Token::Dimension(n, ref u) if (n - 2.0).abs() < 1e-9 && u == "em"));
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize("\"hello world\" 'it\\'s'");
        assert!(matches!(tokens[0], Token::String(ref s) if s == "hello world"));
        assert!(matches!(tokens[2], Token::String(ref s) if s == "it's"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Tokenizer::new("'abc").tokenize_all().unwrap_err();
        assert!(matches!(err, CssError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Tokenizer::new("a /* never closed").tokenize_all().unwrap_err();
        assert!(matches!(err, CssError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_at_keyword() {
        let tokens = tokenize("@import");
        assert!(matches!(tokens[0], Token::AtKeyword(ref s) if s == "import"));
    }

    #[test]
    fn test_function_and_url() {
        let tokens = tokenize("rgb(255, 0, 0) url(a/b.css) url('c.css')");
        assert!(matches!(tokens[0], Token::Function(ref s) if s == "rgb"));
        assert!(tokens.contains(&Token::Url("a/b.css".to_string())));
        assert!(tokens.contains(&Token::Function("url".to_string())));
        assert!(tokens.contains(&Token::String("c.css".to_string())));
    }

    #[test]
    fn test_combinators() {
        let tokens = tokenize("View > Label");
        assert!(matches!(tokens[0], Token::Ident(ref s) if s == "View"));
        assert!(matches!(tokens[2], Token::Delim('>')));
        assert!(matches!(tokens[4], Token::Ident(ref s) if s == "Label"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let a = Token::Ident("a".to_string());
        let b = Token::Ident("b".to_string());
        assert_eq!(tokenize("a/* x */b"), vec![a.clone(), b.clone()]);
        assert_eq!(tokenize("a /* x */b"), vec![a.clone(), Token::Whitespace, b.clone()]);
        assert_eq!(tokenize("a/* x */ /* y */b"), vec![a, Token::Whitespace, b]);
    }

    #[test]
    fn test_raw_text_skips_comments() {
        let input = "  bold /* weight */ 12px/*x*/serif  ";
        let mut tokenizer = Tokenizer::new(input);
        let mut text = RawText::new();
        loop {
            let (token, span) = tokenizer.next_spanned().unwrap();
            if token == Token::Eof {
                break;
            }
            text.push(input, &token, span);
        }
        assert_eq!(text.finish(), "bold 12px serif");
    }

    #[test]
    fn test_spans_cover_source() {
        let input = "width: 50px;";
        let mut tokenizer = Tokenizer::new(input);
        let mut spans = Vec::new();
        loop {
            let (token, span) = tokenizer.next_spanned().unwrap();
            if token == Token::Eof {
                break;
            }
            spans.push((token, &input[span.start..span.end]));
        }
        assert_eq!(spans[3].1, "50px");
        assert_eq!(spans[4].1, ";");
    }

    #[test]
    fn test_location_with_origin() {
        let mut tokenizer = Tokenizer::with_origin("a\nb", SourceLocation::new(4, 7, 30));
        assert_eq!(tokenizer.location(), SourceLocation::new(4, 7, 30));
        tokenizer.next_token().unwrap();
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.location(), SourceLocation::new(5, 1, 32));
    }
}
