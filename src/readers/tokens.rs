//! Whitespace token stream with line tracking, plus the structural warnings
//! raised while walking it.

use thiserror::Error;

use crate::error::ConvertError;

/// One whitespace-separated token and the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Split a `key=value` token at its first `=`.
    pub fn key_value(&self) -> Option<(&'a str, &'a str)> {
        self.text.split_once('=')
    }

    /// Key of a `Point_<n>-><field>=<value>` token.
    pub fn point_key(&self) -> Option<PointKey<'a>> {
        let (key, _) = self.key_value()?;
        PointKey::parse(key)
    }
}

/// The `Point_<n>-><field>` part of a record token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointKey<'a> {
    pub point: usize,
    pub field: &'a str,
}

impl<'a> PointKey<'a> {
    pub fn parse(key: &'a str) -> Option<Self> {
        let (prefix, field) = key.split_once("->")?;
        let point = prefix.strip_prefix("Point_")?.parse().ok()?;
        Some(Self { point, field })
    }
}

/// Cursor over the tokens of a document.
#[derive(Debug)]
pub struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(content: &'a str) -> Self {
        let tokens = content
            .lines()
            .enumerate()
            .flat_map(|(idx, line)| {
                line.split_whitespace()
                    .map(move |text| Token { text, line: idx + 1 })
            })
            .collect();
        Self { tokens, pos: 0 }
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    /// Line of the most recently consumed token, or 0 before the first.
    pub fn line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.line)
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }
}

/// A structural problem found in an input document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {issue}")]
pub struct FormatWarning {
    pub line: usize,
    pub issue: FormatIssue,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatIssue {
    #[error("expected `{expected}`, found `{found}`")]
    UnexpectedKey { expected: String, found: String },

    #[error("value `{value}` of `{key}` is not a number")]
    InvalidNumber { key: String, value: String },

    #[error("token for point {found} inside the record of point {expected}")]
    PointMismatch { expected: usize, found: usize },

    #[error("document ends inside the record of point {0}")]
    TruncatedRecord(usize),

    #[error("`{key}` has no component {axis}")]
    MissingComponent { key: String, axis: usize },

    #[error("header declares {declared} points but {found} were read")]
    CountMismatch { declared: usize, found: usize },

    #[error("{0} trailing values do not form a whole point")]
    TrailingValues(usize),

    #[error("document holds no image paths")]
    MissingImagePaths,
}

/// Collects warnings, or turns the first one into an error in strict mode.
#[derive(Debug, Default)]
pub struct WarningSink {
    strict: bool,
    warnings: Vec<FormatWarning>,
}

impl WarningSink {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            warnings: Vec::new(),
        }
    }

    pub fn report(&mut self, line: usize, issue: FormatIssue) -> Result<(), ConvertError> {
        let warning = FormatWarning { line, issue };
        if self.strict {
            return Err(ConvertError::Format(warning));
        }
        tracing::warn!(line = warning.line, "{}", warning.issue);
        self.warnings.push(warning);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<FormatWarning> {
        self.warnings
    }
}
