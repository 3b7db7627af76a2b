//! Argument tokens and value resolution.
//!
//! A command's arguments are split on whitespace. A token may be wrapped in
//! double quotes (with `\"` and `\\` escapes) or single quotes (verbatim),
//! in which case its inner whitespace is kept. Once unquoted, every
//! `{NAME}` reference is replaced by the variable's current value.

use crate::context::ParseContext;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;
use webunit_core::Modifiers;
use winnow::combinator::{alt, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, take_till};

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A raw argument token, quotes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    raw: &'a str,
    quoted: bool,
}

impl<'a> Token<'a> {
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// The modifier flag this token spells, if it is an unquoted `!`, `~`
    /// or `/`.
    pub fn modifier(&self) -> Option<Modifiers> {
        if self.quoted {
            None
        } else {
            Modifiers::from_token(self.raw)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unterminated quote in {0}.")]
    UnterminatedQuote(String),
    #[error("Missing whitespace after closing quote in {0}.")]
    TrailingCharacters(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Variable {0} is not defined.")]
    MissingVariable(String),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

// ============ Tokenizer ============

fn double_quoted_body(input: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((preceded('\\', any).void(), none_of(['"', '\\']).void())),
    )
    .parse_next(input)
}

fn double_quoted<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    ('"', double_quoted_body, '"').take().parse_next(input)
}

fn single_quoted<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    ('\'', take_till(0.., '\''), '\'').take().parse_next(input)
}

fn bare<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., char::is_whitespace).parse_next(input)
}

fn token<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    alt((
        alt((double_quoted, single_quoted)).map(|raw| Token { raw, quoted: true }),
        bare.map(|raw| Token { raw, quoted: false }),
    ))
    .parse_next(input)
}

/// Splits an argument string into tokens.
pub fn tokenize(arguments: &str) -> Result<Vec<Token<'_>>, TokenizeError> {
    let mut input = arguments.trim_start();
    let mut tokens = Vec::new();

    while !input.is_empty() {
        let parsed = token
            .parse_next(&mut input)
            .map_err(|_| TokenizeError::UnterminatedQuote(input.to_string()))?;

        if !parsed.quoted && parsed.raw.starts_with(['"', '\'']) {
            return Err(TokenizeError::UnterminatedQuote(parsed.raw.to_string()));
        }
        if parsed.quoted && input.starts_with(|c: char| !c.is_whitespace()) {
            let end = input.find(char::is_whitespace).unwrap_or(input.len());
            return Err(TokenizeError::TrailingCharacters(format!(
                "{}{}",
                parsed.raw,
                &input[..end]
            )));
        }

        tokens.push(parsed);
        input = input.trim_start();
    }

    Ok(tokens)
}

// ============ Values ============

/// Resolves raw tokens into literal values against a [`ParseContext`].
pub struct ValueParser<'c> {
    context: &'c ParseContext,
}

impl<'c> ValueParser<'c> {
    pub fn new(context: &'c ParseContext) -> Self {
        Self { context }
    }

    /// Trims, unquotes and substitutes variables in one raw value.
    pub fn parse_text(&self, raw: &str) -> Result<String, ValueError> {
        let text = unquote(raw.trim())?;
        self.substitute(&text)
    }

    /// Replaces each `{NAME}` once; substituted values are not scanned
    /// again.
    pub fn substitute(&self, text: &str) -> Result<String, ValueError> {
        let mut result = String::with_capacity(text.len());
        let mut last_end = 0;

        for caps in VARIABLE_PATTERN.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .context
                .get(name.as_str())
                .ok_or_else(|| ValueError::MissingVariable(name.as_str().to_string()))?;
            result.push_str(&text[last_end..whole.start()]);
            result.push_str(value);
            last_end = whole.end();
        }

        result.push_str(&text[last_end..]);
        Ok(result)
    }
}

fn unquote(text: &str) -> Result<Cow<'_, str>, TokenizeError> {
    if text.starts_with('"') {
        let mut input = text;
        match double_quoted.parse_next(&mut input) {
            Ok(quoted) if input.is_empty() => Ok(Cow::Owned(unescape(&quoted[1..quoted.len() - 1]))),
            _ => Err(TokenizeError::UnterminatedQuote(text.to_string())),
        }
    } else if text.starts_with('\'') {
        let mut input = text;
        match single_quoted.parse_next(&mut input) {
            Ok(quoted) if input.is_empty() => Ok(Cow::Borrowed(&quoted[1..quoted.len() - 1])),
            _ => Err(TokenizeError::UnterminatedQuote(text.to_string())),
        }
    } else {
        Ok(Cow::Borrowed(text))
    }
}

// Only `\"` and `\\` are escapes; other backslashes are kept so regular
// expressions such as `"\d+"` survive quoting.
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(c);
    }
    result
}
