//! Selector Parser
//!
//! Parses selector lists into flat sequences of simple selectors and
//! combinators. The grammar accepted here is wider than what the style
//! index can represent; narrowing happens during canonicalization.

use std::fmt;

use crate::error::{CssError, CssResult, SourceLocation};
use crate::tokenizer::{RawText, Span, Token, Tokenizer};

/// A complete selector (one entry of a comma-separated list)
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Simple selectors and combinators, left to right as written
    pub parts: Vec<SelectorPart>,
    /// Specificity of this selector
    pub specificity: Specificity,
    /// Selector text as written (trimmed)
    pub text: String,
}

/// A part of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Type selector (e.g., View, Label). Case is preserved.
    Type(String),
    /// Class selector (e.g., .container)
    Class(String),
    /// ID selector (e.g., #main)
    Id(String),
    /// Attribute selector (e.g., [kind="primary"])
    Attribute {
        name: String,
        op: Option<AttributeOp>,
        value: Option<String>,
    },
    /// Pseudo-class (e.g., :first-child, :nth-child(2n+1))
    PseudoClass {
        name: String,
        /// Raw argument text for functional pseudo-classes
        args: Option<String>,
    },
    /// Pseudo-element (e.g., ::before)
    PseudoElement(String),
    /// Combinator between compound selectors
    Combinator(Combinator),
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// [attr=value]
    Equals,
    /// [attr~=value]
    Includes,
    /// [attr|=value]
    DashMatch,
    /// [attr^=value]
    PrefixMatch,
    /// [attr$=value]
    SuffixMatch,
    /// [attr*=value]
    SubstringMatch,
}

impl AttributeOp {
    fn from_delim(c: char) -> Option<Self> {
        match c {
            '~' => Some(Self::Includes),
            '|' => Some(Self::DashMatch),
            '^' => Some(Self::PrefixMatch),
            '$' => Some(Self::SuffixMatch),
            '*' => Some(Self::SubstringMatch),
            _ => None,
        }
    }

    /// Operator as written in source
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::PrefixMatch => "^=",
            Self::SuffixMatch => "$=",
            Self::SubstringMatch => "*=",
        }
    }
}

/// Selector combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace)
    Descendant,
    /// Child combinator (>)
    Child,
    /// Next sibling combinator (+)
    NextSibling,
    /// Subsequent sibling combinator (~)
    SubsequentSibling,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Descendant => "descendant",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        };
        f.write_str(s)
    }
}

/// Selector specificity (a, b, c)
/// a = ID selectors
/// b = class selectors, attribute selectors, pseudo-classes
/// c = type selectors, pseudo-elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Add another specificity
    pub fn add(&mut self, other: &Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }

    /// Pack into the single integer weight stored on declarations.
    /// Each component saturates at 255 so packing stays order-preserving.
    pub fn priority(&self) -> i32 {
        let clamp = |v: u32| v.min(0xFF) as i32;
        (clamp(self.a) << 16) | (clamp(self.b) << 8) | clamp(self.c)
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.a
            .cmp(&other.a)
            .then_with(|| self.b.cmp(&other.b))
            .then_with(|| self.c.cmp(&other.c))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Selector {
    /// Parse a single selector
    pub fn parse(input: &str) -> CssResult<Self> {
        let mut selectors = Self::parse_list(input)?;
        if selectors.len() != 1 {
            return Err(CssError::invalid_selector(input.trim(), SourceLocation::start()));
        }
        Ok(selectors.remove(0))
    }

    /// Parse a comma-separated list of selectors
    pub fn parse_list(input: &str) -> CssResult<Vec<Self>> {
        Self::parse_list_at(input, SourceLocation::start())
    }

    /// Parse a selector list that starts at `origin` in an enclosing document
    pub fn parse_list_at(input: &str, origin: SourceLocation) -> CssResult<Vec<Self>> {
        let mut parser = SelectorParser::new(input, origin)?;
        parser.parse_selector_list()
    }

    /// Whether this selector contains any combinator
    pub fn has_combinator(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, SelectorPart::Combinator(_)))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

struct SelectorParser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    span: Span,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str, origin: SourceLocation) -> CssResult<Self> {
        let mut tokenizer = Tokenizer::with_origin(input, origin);
        let (current, span) = tokenizer.next_spanned()?;
        Ok(Self { tokenizer, current, span })
    }

    fn location(&self) -> SourceLocation {
        self.tokenizer.location()
    }

    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> CssResult<Token> {
        let (next, span) = self.tokenizer.next_spanned()?;
        self.span = span;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn skip_whitespace(&mut self) -> CssResult<()> {
        while matches!(self.peek(), Token::Whitespace) {
            self.advance()?;
        }
        Ok(())
    }

    fn error(&self, text: impl Into<String>) -> CssError {
        CssError::invalid_selector(text, self.location())
    }

    fn parse_selector_list(&mut self) -> CssResult<Vec<Selector>> {
        let mut selectors = Vec::new();

        loop {
            self.skip_whitespace()?;
            let start = self.span.start;
            let selector = self.parse_selector(start)?;
            selectors.push(selector);

            match self.peek() {
                Token::Comma => {
                    self.advance()?;
                }
                Token::Eof => break,
                other => return Err(self.error(format!("{:?}", other))),
            }
        }

        Ok(selectors)
    }

    fn parse_selector(&mut self, start: usize) -> CssResult<Selector> {
        let mut parts = Vec::new();
        let mut specificity = Specificity::default();
        let mut end = start;
        // Set once a compound selector is complete and a combinator may follow
        let mut after_compound = false;

        loop {
            let had_whitespace = matches!(self.peek(), Token::Whitespace);
            self.skip_whitespace()?;

            if matches!(self.peek(), Token::Eof | Token::Comma) {
                break;
            }

            if let Some(combinator) = self.try_parse_combinator()? {
                if !after_compound {
                    return Err(self.error(combinator.to_string()));
                }
                parts.push(SelectorPart::Combinator(combinator));
                after_compound = false;
                self.skip_whitespace()?;
            } else if after_compound && had_whitespace {
                parts.push(SelectorPart::Combinator(Combinator::Descendant));
                after_compound = false;
            }

            let mut parsed_any = false;
            while let Some((part, weight)) = self.try_parse_simple_selector()? {
                parts.push(part);
                specificity.add(&weight);
                end = self.span.start;
                parsed_any = true;
            }

            if !parsed_any {
                return Err(self.error(format!("{:?}", self.peek())));
            }
            after_compound = true;
        }

        if !after_compound {
            // Empty selector or dangling combinator
            let text = self.tokenizer.input()[start..end.max(start)].trim().to_string();
            return Err(self.error(text));
        }

        let text = self.tokenizer.input()[start..end].trim().to_string();
        Ok(Selector { parts, specificity, text })
    }

    fn try_parse_combinator(&mut self) -> CssResult<Option<Combinator>> {
        let combinator = match self.peek() {
            Token::Delim('>') => Combinator::Child,
            Token::Delim('+') => Combinator::NextSibling,
            Token::Delim('~') => Combinator::SubsequentSibling,
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(combinator))
    }

    fn try_parse_simple_selector(&mut self) -> CssResult<Option<(SelectorPart, Specificity)>> {
        match self.peek().clone() {
            Token::Delim('*') => {
                self.advance()?;
                Ok(Some((SelectorPart::Universal, Specificity::default())))
            }
            Token::Ident(name) => {
                self.advance()?;
                Ok(Some((SelectorPart::Type(name), Specificity::new(0, 0, 1))))
            }
            Token::Hash(name, _) => {
                self.advance()?;
                Ok(Some((SelectorPart::Id(name), Specificity::new(1, 0, 0))))
            }
            Token::Delim('.') => {
                self.advance()?;
                match self.advance()? {
                    Token::Ident(name) => Ok(Some((SelectorPart::Class(name), Specificity::new(0, 1, 0)))),
                    _ => Err(self.error(".")),
                }
            }
            Token::LeftBracket => self.parse_attribute_selector().map(Some),
            Token::Colon => self.parse_pseudo_selector().map(Some),
            _ => Ok(None),
        }
    }

    fn parse_attribute_selector(&mut self) -> CssResult<(SelectorPart, Specificity)> {
        self.advance()?; // '['
        self.skip_whitespace()?;

        let name = match self.advance()? {
            Token::Ident(name) => name,
            _ => return Err(self.error("[")),
        };
        self.skip_whitespace()?;

        let op = match self.peek().clone() {
            Token::Delim('=') => {
                self.advance()?;
                Some(AttributeOp::Equals)
            }
            Token::Delim(c) => {
                let op = AttributeOp::from_delim(c).ok_or_else(|| self.error(format!("[{}{}", name, c)))?;
                self.advance()?;
                if !matches!(self.advance()?, Token::Delim('=')) {
                    return Err(self.error(format!("[{}{}", name, c)));
                }
                Some(op)
            }
            _ => None,
        };

        let value = if op.is_some() {
            self.skip_whitespace()?;
            let span = self.span;
            match self.advance()? {
                Token::Ident(v) | Token::String(v) => Some(v),
                // Numbers keep their source spelling, so `01` stays `01`
                Token::Number(_) | Token::Dimension(..) | Token::Percentage(_) => {
                    Some(self.tokenizer.input()[span.start..span.end].to_string())
                }
                _ => return Err(self.error(format!("[{}=", name))),
            }
        } else {
            None
        };

        self.skip_whitespace()?;
        if !matches!(self.advance()?, Token::RightBracket) {
            return Err(self.error(format!("[{}", name)));
        }

        Ok((SelectorPart::Attribute { name, op, value }, Specificity::new(0, 1, 0)))
    }

    fn parse_pseudo_selector(&mut self) -> CssResult<(SelectorPart, Specificity)> {
        self.advance()?; // ':'

        let is_element = if matches!(self.peek(), Token::Colon) {
            self.advance()?;
            true
        } else {
            false
        };

        let (name, is_function) = match self.advance()? {
            Token::Ident(name) => (name.to_ascii_lowercase(), false),
            Token::Function(name) => (name.to_ascii_lowercase(), true),
            _ => return Err(self.error(":")),
        };

        // Legacy pseudo-elements with single colon
        if is_element || matches!(name.as_str(), "before" | "after" | "first-line" | "first-letter") {
            if is_function {
                self.parse_pseudo_args()?;
            }
            return Ok((SelectorPart::PseudoElement(name), Specificity::new(0, 0, 1)));
        }

        let args = if is_function { Some(self.parse_pseudo_args()?) } else { None };

        Ok((SelectorPart::PseudoClass { name, args }, Specificity::new(0, 1, 0)))
    }

    /// Collect the source text of a functional pseudo-class argument.
    /// The opening '(' was consumed with the function token.
    fn parse_pseudo_args(&mut self) -> CssResult<String> {
        let mut text = RawText::new();
        let mut depth = 1;

        loop {
            match self.peek() {
                Token::LeftParen | Token::Function(_) => depth += 1,
                Token::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance()?;
                        return Ok(text.finish());
                    }
                }
                Token::Eof => return Err(CssError::unexpected_eof(self.location())),
                _ => {}
            }
            text.push(self.tokenizer.input(), self.peek(), self.span);
            self.advance()?;
        }
    }
}
