//! The token definition table
//!
//! Tokens are declared as regex patterns with a priority: lower priorities
//! are tried first, ties broken by declaration order. Ignored definitions
//! (whitespace, comments) still advance the scan but are dropped from the
//! output stream.

use super::TokenKind;

#[derive(Debug, Clone)]
pub struct TokenDefinition {
    pub kind: TokenKind,
    pub pattern: String,
    pub ignored: bool,
    pub priority: i32,
}

impl TokenDefinition {
    pub fn new(kind: TokenKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            ignored: false,
            priority: 0,
        }
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

fn reserved_words(words: &[&str]) -> TokenDefinition {
    let pattern = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    TokenDefinition::new(TokenKind::ReservedWord, pattern).priority(-1)
}

/// The default Frond lexicon.
pub fn default_definitions() -> Vec<TokenDefinition> {
    vec![
        TokenDefinition::new(
            TokenKind::DecimalNumber,
            r"[+-]?[0-9]+(\.[0-9]+)?([eE]-?[0-9]+)?",
        )
        .priority(-1),
        TokenDefinition::new(TokenKind::BinaryNumber, r"0[bB][01]+").priority(-2),
        TokenDefinition::new(TokenKind::HexNumber, r"0[xX][0-9a-fA-F]+").priority(-2),
        TokenDefinition::new(TokenKind::RationalNumber, r"[+-]?[0-9]+\s*/\s*[0-9]+").priority(-2),
        TokenDefinition::new(
            TokenKind::ComplexNumber,
            r"[+-]?[0-9]+(\.[0-9]+)?([eE]-?[0-9]+)?\s*[+-]\s*[0-9]+(\.[0-9]+)?([eE]-?[0-9]+)?i",
        )
        .priority(-2),
        TokenDefinition::new(TokenKind::Identifier, r#"[^\s\[\](){},."';`]+"#),
        TokenDefinition::new(TokenKind::Str, r#""(\\"|[^"])*""#),
        TokenDefinition::new(TokenKind::OpenGroup, r"\("),
        TokenDefinition::new(TokenKind::CloseGroup, r"\)"),
        TokenDefinition::new(TokenKind::OpenList, r"\["),
        TokenDefinition::new(TokenKind::CloseList, r"\]"),
        TokenDefinition::new(TokenKind::Period, r"\."),
        TokenDefinition::new(TokenKind::Comma, ","),
        TokenDefinition::new(TokenKind::Backquote, "`"),
        TokenDefinition::new(TokenKind::Newline, ";"),
        TokenDefinition::new(TokenKind::Whitespace, r"\s+").ignored(),
        TokenDefinition::new(TokenKind::Comment, r"'[^']*'?").ignored(),
        reserved_words(&[
            "let",
            "ref",
            "if",
            "then",
            "else",
            "operator",
            "set!",
            "using",
            "namespace",
            "lambda",
        ]),
    ]
}
