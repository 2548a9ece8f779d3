//! Tokenization for the Frond language
//!
//! The lexer is driven by an ordered table of regex token definitions (see
//! [`definitions`]) and is indentation-aware: changes in leading whitespace
//! become synthetic group-open ("indent") and group-close ("dedent") tokens,
//! with a synthetic "bof"/"eof" pair bracketing the whole stream.

mod definitions;

use std::fmt;

use regex::Regex;
use thiserror::Error;
use tracing::trace;

pub use definitions::{default_definitions, TokenDefinition};

/// Token categories produced by the lexer.
///
/// The numeric literal subtypes are kept distinct so the evaluator can parse
/// each with its own grammar. `Number` is the abstract category: it can be
/// declared in a custom definition table, but the grammar never accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    DecimalNumber,
    BinaryNumber,
    HexNumber,
    RationalNumber,
    ComplexNumber,
    Number,
    Identifier,
    Str,
    OpenGroup,
    CloseGroup,
    OpenList,
    CloseList,
    Period,
    Backquote,
    Comma,
    Newline,
    Whitespace,
    Comment,
    ReservedWord,
    Unrecognized,
}

impl TokenKind {
    /// Whether this kind is one of the concrete numeric literal subtypes.
    pub fn is_number_literal(self) -> bool {
        matches!(
            self,
            TokenKind::DecimalNumber
                | TokenKind::BinaryNumber
                | TokenKind::HexNumber
                | TokenKind::RationalNumber
                | TokenKind::ComplexNumber
        )
    }
}

/// A single lexed token. Line numbers are 1-based (the synthetic "bof" token
/// uses line 0); columns are 0-based and include the indentation width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            content: content.into(),
            line,
            column,
        }
    }

    /// Returns a human-readable description of the token for diagnostics
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier '{}'", self.content),
            TokenKind::ReservedWord => format!("reserved word '{}'", self.content),
            TokenKind::Str => format!("string {}", self.content),
            TokenKind::Newline => "newline".to_string(),
            kind if kind.is_number_literal() || kind == TokenKind::Number => {
                format!("number '{}'", self.content)
            }
            _ => format!("'{}'", self.content),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}:{} at {},{}]",
            self.kind, self.content, self.line, self.column
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unrecognized token '{content}' at {line},{column}")]
    UnrecognizedToken {
        content: String,
        line: usize,
        column: usize,
    },
    #[error("invalid token definition: {0}")]
    InvalidDefinition(String),
}

/// The indentation-aware lexer.
///
/// A fresh call to [`Lexer::tokenize`] re-reads from the start of the given
/// source; the emitted sequence is finite and consumed in a single pass.
pub struct Lexer {
    definitions: Vec<TokenDefinition>,
    regex: Regex,
    tab_width: usize,
}

impl Lexer {
    /// Build a lexer from a definition table. Definitions are sorted by
    /// priority (lower first, ties broken by declaration order) and compiled
    /// into one alternation, followed by a catch-all single-character pattern
    /// whose match raises a [`SyntaxError`].
    pub fn new(definitions: Vec<TokenDefinition>) -> Result<Self, SyntaxError> {
        let mut definitions = definitions;
        definitions.sort_by_key(|def| def.priority);

        let alternation = definitions
            .iter()
            .enumerate()
            .map(|(index, def)| format!("(?P<t{index}>{})", def.pattern))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("{alternation}|(?P<unrecognized>.)"))
            .map_err(|err| SyntaxError::InvalidDefinition(err.to_string()))?;

        Ok(Self {
            definitions,
            regex,
            tab_width: 4,
        })
    }

    /// Build a lexer over the default Frond lexicon.
    pub fn with_defaults() -> Result<Self, SyntaxError> {
        Self::new(default_definitions())
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Set the width a tab character contributes to the indentation level.
    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width;
    }

    /// Tokenize a complete source text.
    ///
    /// Tokenization is eager: the first unrecognized character abandons the
    /// pass and surfaces as an error.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = vec![Token::new(TokenKind::OpenGroup, "bof", 0, 0)];
        let mut indents: Vec<usize> = vec![0];
        let mut line_no = 0usize;

        for line in source.lines() {
            line_no += 1;
            let trimmed = line.trim_start();
            let indent = self.indentation_width(&line[..line.len() - trimmed.len()]);

            let (content, last_end) = self.line_tokens(trimmed, line_no, indent)?;
            if content.is_empty() {
                // Blank and comment-only lines produce nothing and leave the
                // indentation stack untouched.
                continue;
            }

            self.indentation_tokens(indent, &mut indents, line_no, &mut tokens);
            tokens.extend(content);
            tokens.push(Token::new(TokenKind::Newline, "", line_no, indent + last_end));
        }

        while indents.last().copied().unwrap_or(0) > 0 {
            indents.pop();
            tokens.push(Token::new(TokenKind::CloseGroup, "dedent", line_no, 0));
            tokens.push(Token::new(TokenKind::Newline, "", line_no, 0));
        }
        tokens.push(Token::new(TokenKind::CloseGroup, "eof", line_no, 0));

        trace!(tokens = tokens.len(), lines = line_no, "tokenized source");
        Ok(tokens)
    }

    fn indentation_width(&self, whitespace: &str) -> usize {
        whitespace
            .chars()
            .map(|c| match c {
                '\t' => self.tab_width,
                ' ' => 1,
                _ => 0,
            })
            .sum()
    }

    /// Emit indent/dedent markers for a change in indentation level.
    ///
    /// Dedenting pops levels until the stack top no longer exceeds the new
    /// width; a width that matches no remaining level realigns silently.
    fn indentation_tokens(
        &self,
        indent: usize,
        indents: &mut Vec<usize>,
        line: usize,
        tokens: &mut Vec<Token>,
    ) {
        let current = indents.last().copied().unwrap_or(0);
        if indent > current {
            indents.push(indent);
            tokens.push(Token::new(TokenKind::OpenGroup, "indent", line, 0));
        } else if indent < current {
            while indents.last().copied().unwrap_or(0) > indent {
                indents.pop();
                tokens.push(Token::new(TokenKind::CloseGroup, "dedent", line, 0));
                tokens.push(Token::new(TokenKind::Newline, "", line, 0));
            }
        }
    }

    /// Tokenize the content of one line (already stripped of leading
    /// whitespace). Returns the kept tokens plus the end offset of the last
    /// kept token, which positions the synthetic end-of-line newline.
    fn line_tokens(
        &self,
        trimmed: &str,
        line: usize,
        indent: usize,
    ) -> Result<(Vec<Token>, usize), SyntaxError> {
        let mut tokens = Vec::new();
        let mut last_end = 0usize;
        let mut pos = 0usize;

        while pos < trimmed.len() {
            let captures = match self.regex.captures_at(trimmed, pos) {
                Some(captures) => captures,
                None => break,
            };
            let matched = match captures.get(0) {
                Some(matched) => matched,
                None => break,
            };

            if captures.name("unrecognized").is_some() {
                return Err(SyntaxError::UnrecognizedToken {
                    content: matched.as_str().to_string(),
                    line,
                    column: indent + matched.start(),
                });
            }

            let index =
                (0..self.definitions.len()).find(|i| captures.name(&format!("t{i}")).is_some());
            if let Some(index) = index {
                let definition = &self.definitions[index];
                if !definition.ignored {
                    tokens.push(Token::new(
                        definition.kind,
                        matched.as_str(),
                        line,
                        indent + matched.start(),
                    ));
                    last_end = matched.end();
                }
            }

            // An empty match (a definition with a star quantifier) must not
            // stall the scan.
            pos = if matched.end() > pos {
                matched.end()
            } else {
                pos + trimmed[pos..].chars().next().map_or(1, char::len_utf8)
            };
        }

        Ok((tokens, last_end))
    }
}
