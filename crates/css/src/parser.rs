//! Stylesheet Parser
//!
//! Parses a stylesheet into its `@import` statements and style rules.
//! Declaration values are kept as raw text; typing them is left to the
//! attribute registry downstream.

use crate::error::{CssError, CssResult, SourceLocation};
use crate::selector::Selector;
use crate::tokenizer::{RawText, Span, Token, Tokenizer};

/// A parsed stylesheet
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    /// `@import` statements in source order
    pub imports: Vec<ImportRule>,
    /// Style rules in source order
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parse a stylesheet
    pub fn parse(input: &str) -> CssResult<Self> {
        let mut parser = CssParser::new(input)?;
        parser.parse_stylesheet()
    }

    /// Create a new empty stylesheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of declarations over all rules
    pub fn declaration_count(&self) -> usize {
        self.rules.iter().map(|r| r.declarations.len()).sum()
    }
}

/// A style rule (selector list and declaration block)
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    /// Where the selector list starts
    pub location: SourceLocation,
}

/// `@import` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRule {
    /// Import target as written
    pub url: String,
    pub location: SourceLocation,
}

/// A declaration (property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name as written
    pub property: String,
    /// Raw value text. A value made of a single quoted string is unquoted.
    pub value: String,
    /// Whether !important was specified
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }
}

/// Stylesheet parser
pub struct CssParser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    span: Span,
    /// Location of `current`
    current_location: SourceLocation,
}

impl<'a> CssParser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> CssResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current_location = tokenizer.location();
        let (current, span) = tokenizer.next_spanned()?;
        Ok(Self { tokenizer, current, span, current_location })
    }

    fn input(&self) -> &'a str {
        self.tokenizer.input()
    }

    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> CssResult<Token> {
        let location = self.tokenizer.location();
        let (next, span) = self.tokenizer.next_spanned()?;
        self.span = span;
        self.current_location = location;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn skip_whitespace(&mut self) -> CssResult<()> {
        while matches!(self.peek(), Token::Whitespace) {
            self.advance()?;
        }
        Ok(())
    }

    fn expected(&self, what: &'static str) -> CssError {
        if matches!(self.peek(), Token::Eof) {
            return CssError::unexpected_eof(self.current_location);
        }
        let found = &self.input()[self.span.start..self.span.end];
        CssError::expected(what, found, self.current_location)
    }

    /// Parse a complete stylesheet
    pub fn parse_stylesheet(&mut self) -> CssResult<Stylesheet> {
        let mut stylesheet = Stylesheet::new();

        loop {
            self.skip_whitespace()?;

            match self.peek().clone() {
                Token::Eof => break,
                Token::AtKeyword(name) => {
                    let location = self.current_location;
                    self.advance()?;
                    match name.to_ascii_lowercase().as_str() {
                        "import" => {
                            let import = self.parse_import_rule(location)?;
                            log::trace!("@import '{}' at {}", import.url, location);
                            stylesheet.imports.push(import);
                        }
                        "charset" => self.skip_statement()?,
                        _ => return Err(CssError::UnsupportedAtRule { name, location }),
                    }
                }
                _ => {
                    let rule = self.parse_style_rule()?;
                    stylesheet.rules.push(rule);
                }
            }
        }

        Ok(stylesheet)
    }

    /// Parse the remainder of `@import <target>;`
    fn parse_import_rule(&mut self, location: SourceLocation) -> CssResult<ImportRule> {
        self.skip_whitespace()?;

        let url = match self.peek().clone() {
            Token::String(s) | Token::Url(s) => {
                self.advance()?;
                s
            }
            Token::Function(name) if name.eq_ignore_ascii_case("url") => {
                self.advance()?;
                self.skip_whitespace()?;
                let url = match self.peek().clone() {
                    Token::String(s) => s,
                    _ => return Err(self.expected("import target string")),
                };
                self.advance()?;
                self.skip_whitespace()?;
                if !matches!(self.peek(), Token::RightParen) {
                    return Err(self.expected("')'"));
                }
                self.advance()?;
                url
            }
            _ => return Err(self.expected("import target")),
        };

        self.skip_whitespace()?;
        if !matches!(self.peek(), Token::Semicolon) {
            // Media and supports conditions are not supported
            return Err(self.expected("';'"));
        }
        self.advance()?;

        Ok(ImportRule { url, location })
    }

    fn skip_statement(&mut self) -> CssResult<()> {
        loop {
            match self.advance()? {
                Token::Semicolon => return Ok(()),
                Token::Eof => return Err(CssError::unexpected_eof(self.current_location)),
                _ => {}
            }
        }
    }

    /// Parse a style rule (selectors { declarations })
    fn parse_style_rule(&mut self) -> CssResult<StyleRule> {
        let location = self.current_location;
        let start = self.span.start;

        loop {
            match self.peek() {
                Token::LeftBrace => break,
                Token::Eof => return Err(self.expected("'{'")),
                Token::RightBrace | Token::Semicolon => return Err(self.expected("selector")),
                _ => {
                    self.advance()?;
                }
            }
        }

        let selector_text = &self.input()[start..self.span.start];
        if selector_text.trim().is_empty() {
            return Err(CssError::invalid_selector("", location));
        }
        let selectors = Selector::parse_list_at(selector_text, location)?;

        self.advance()?; // '{'
        let declarations = self.parse_declaration_block()?;

        Ok(StyleRule { selectors, declarations, location })
    }

    /// Parse declarations up to and including the closing '}'
    fn parse_declaration_block(&mut self) -> CssResult<Vec<Declaration>> {
        let mut declarations = Vec::new();

        loop {
            self.skip_whitespace()?;

            match self.peek() {
                Token::RightBrace => {
                    self.advance()?;
                    return Ok(declarations);
                }
                Token::Eof => return Err(self.expected("'}'")),
                Token::Semicolon => {
                    self.advance()?;
                }
                _ => declarations.push(self.parse_declaration()?),
            }
        }
    }

    fn parse_declaration(&mut self) -> CssResult<Declaration> {
        let property = match self.peek().clone() {
            Token::Ident(name) => name,
            _ => return Err(self.expected("property name")),
        };
        self.advance()?;
        self.skip_whitespace()?;

        if !matches!(self.peek(), Token::Colon) {
            return Err(self.expected("':'"));
        }
        self.advance()?;
        self.skip_whitespace()?;

        let location = self.current_location;
        let (value, important) = self.parse_declaration_value()?;
        if value.is_empty() {
            return Err(CssError::EmptyValue { property, location });
        }

        if matches!(self.peek(), Token::Semicolon) {
            self.advance()?;
        }

        Ok(Declaration { property, value, important })
    }

    /// Collect the value text up to ';' or '}' at nesting depth zero
    fn parse_declaration_value(&mut self) -> CssResult<(String, bool)> {
        let mut text = RawText::new();
        let mut depth = 0usize;
        let mut important = false;
        let mut single_string: Option<String> = None;
        let mut token_count = 0usize;

        loop {
            match self.peek().clone() {
                Token::Eof => return Err(self.expected("';' or '}'")),
                Token::Semicolon | Token::RightBrace if depth == 0 => break,
                Token::LeftBrace => return Err(self.expected("value")),
                Token::Delim('!') if depth == 0 => {
                    self.advance()?;
                    self.skip_whitespace()?;
                    if !matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case("important")) {
                        return Err(self.expected("'important'"));
                    }
                    self.advance()?;
                    important = true;
                    self.skip_whitespace()?;
                    if !matches!(self.peek(), Token::Semicolon | Token::RightBrace) {
                        return Err(self.expected("';' or '}'"));
                    }
                    break;
                }
                token => {
                    match token {
                        Token::LeftParen | Token::Function(_) => depth += 1,
                        Token::RightParen => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    text.push(self.input(), &token, self.span);
                    if token != Token::Whitespace {
                        token_count += 1;
                        single_string = match token {
                            Token::String(s) => Some(s),
                            _ => None,
                        };
                    }
                    self.advance()?;
                }
            }
        }

        let value = match single_string {
            Some(s) if token_count == 1 => s,
            _ => text.finish(),
        };
        Ok((value, important))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SelectorPart;

    #[test]
    fn test_simple_rule() {
        let stylesheet = Stylesheet::parse("Label { color: red; }").unwrap();

        assert_eq!(stylesheet.rules.len(), 1);
        let rule = &stylesheet.rules[0];
        assert_eq!(rule.selectors.len(), 1);
        assert_eq!(rule.declarations, vec![Declaration::new("color", "red")]);
    }

    #[test]
    fn test_raw_values_are_preserved() {
        let css = "h1 {width: 100%; height: 50px; left: 20; color: #ffffff; font: bold 12px 'Avenir Next'; }";
        let stylesheet = Stylesheet::parse(css).unwrap();
        let values: Vec<_> = stylesheet.rules[0].declarations.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["100%", "50px", "20", "#ffffff", "bold 12px 'Avenir Next'"]);
    }

    #[test]
    fn test_comments_inside_values_are_dropped() {
        let css = "Label { font: bold /* weight */ 12px; margin: /* none */ 0; color: red/* after */; }";
        let stylesheet = Stylesheet::parse(css).unwrap();
        let values: Vec<_> = stylesheet.rules[0].declarations.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["bold 12px", "0", "red"]);
    }

    #[test]
    fn test_comment_inside_compound_selector() {
        let stylesheet = Stylesheet::parse(".a/* note */.b { x: 1; }").unwrap();
        let selector = &stylesheet.rules[0].selectors[0];
        assert!(!selector.has_combinator());
        assert_eq!(selector.specificity, crate::selector::Specificity::new(0, 2, 0));
    }

    #[test]
    fn test_quoted_values_are_unquoted() {
        let stylesheet = Stylesheet::parse("Label {x: abc; y: 'def'; z: \"ghi\";}").unwrap();
        let values: Vec<_> = stylesheet.rules[0].declarations.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["abc", "def", "ghi"]);
    }

    #[test]
    fn test_function_value_with_semicolon_free_args() {
        let stylesheet = Stylesheet::parse("View { background: rgba(0, 0, 0, 0.5) }").unwrap();
        assert_eq!(stylesheet.rules[0].declarations[0].value, "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_important() {
        let stylesheet = Stylesheet::parse("p { color: red !important; }").unwrap();
        let decl = &stylesheet.rules[0].declarations[0];
        assert!(decl.important);
        assert_eq!(decl.value, "red");
    }

    #[test]
    fn test_multiple_selectors() {
        let stylesheet = Stylesheet::parse("h1, h2, h3 { color: blue; }").unwrap();
        assert_eq!(stylesheet.rules[0].selectors.len(), 3);
    }

    #[test]
    fn test_complex_selector() {
        let stylesheet = Stylesheet::parse("#id > .xyz.abc { rule1: val1; rule2: val2; }").unwrap();
        let rule = &stylesheet.rules[0];
        assert_eq!(rule.selectors[0].parts.len(), 4);
        assert!(matches!(&rule.selectors[0].parts[0], SelectorPart::Id(id) if id == "id"));
        assert_eq!(rule.declarations.len(), 2);
    }

    #[test]
    fn test_imports_in_order() {
        let css = "@import 'abc.css'; @import url(\"xyz.css\"); @import url(bare.css); #id { a: b; }";
        let stylesheet = Stylesheet::parse(css).unwrap();
        let urls: Vec<_> = stylesheet.imports.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["abc.css", "xyz.css", "bare.css"]);
        assert_eq!(stylesheet.rules.len(), 1);
    }

    #[test]
    fn test_import_with_media_condition_is_rejected() {
        assert!(Stylesheet::parse("@import 'a.css' screen;").is_err());
    }

    #[test]
    fn test_unsupported_at_rules() {
        let err = Stylesheet::parse("@media screen { p { a: b; } }").unwrap_err();
        assert!(matches!(err, CssError::UnsupportedAtRule { ref name, .. } if name == "media"));

        let err = Stylesheet::parse("@keyframes spin { from { a: b; } }").unwrap_err();
        assert!(matches!(err, CssError::UnsupportedAtRule { .. }));
    }

    #[test]
    fn test_charset_is_skipped() {
        let stylesheet = Stylesheet::parse("@charset \"utf-8\"; p { a: b; }").unwrap();
        assert_eq!(stylesheet.rules.len(), 1);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(Stylesheet::parse("{}").unwrap_err(), CssError::InvalidSelector { .. }));
        assert!(matches!(Stylesheet::parse("p { color red; }").unwrap_err(), CssError::Expected { .. }));
        assert!(matches!(Stylesheet::parse("p { color: ; }").unwrap_err(), CssError::EmptyValue { .. }));
        assert!(matches!(Stylesheet::parse("p { color: red;").unwrap_err(), CssError::UnexpectedEof { .. }));
        assert!(matches!(Stylesheet::parse("p color: red;").unwrap_err(), CssError::Expected { .. }));
    }

    #[test]
    fn test_error_location() {
        let err = Stylesheet::parse("p { a: b; }\nq { c d; }").unwrap_err();
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_selector_error_location() {
        let err = Stylesheet::parse("p { a: b; }\n\n  a > { c: d; }").unwrap_err();
        assert!(matches!(err, CssError::InvalidSelector { .. }));
        assert_eq!(err.location().line, 3);
    }

    #[test]
    fn test_empty_stylesheet_and_comments() {
        assert!(Stylesheet::parse("   ").unwrap().rules.is_empty());
        let stylesheet = Stylesheet::parse("/* comment */ p { color: red; } /* trailing */").unwrap();
        assert_eq!(stylesheet.rules.len(), 1);
        assert_eq!(stylesheet.declaration_count(), 1);
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let stylesheet = Stylesheet::parse("p { a: 1; b: 2 }").unwrap();
        assert_eq!(stylesheet.rules[0].declarations[1], Declaration::new("b", "2"));
    }
}
