//! Assertions evaluated against a fetched page.
//!
//! Every assertion computes a variant-specific boolean, inverts it when
//! the `NOT` modifier is set and, on failure, renders a message followed by
//! the modifier suffix (see [`Modifiers::suffix`]).

use crate::error::{Error, Result};
use crate::location::Location;
use crate::modifiers::Modifiers;
use crate::page::PageResult;
use regex::{Regex, RegexBuilder};

const EXCERPT_LEN: usize = 100;

// NOT is implied by the variant itself.
const CONTAINS_NOT_MODIFIERS: Modifiers = Modifiers::CASE_INSENSITIVE.combined_with(Modifiers::REGEXP);

/// How a [`TextMatcher`] relates the expected text to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The expected text occurs somewhere in the subject.
    Substring,
    /// The expected text covers the whole subject.
    Exact,
}

/// String comparison shared by the body and header assertions, honoring
/// the `CASE_INSENSITIVE` and `REGEXP` modifiers.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    expected: String,
    mode: MatchMode,
    case_insensitive: bool,
    regex: Option<Regex>,
}

impl TextMatcher {
    pub fn new(expected: impl Into<String>, mode: MatchMode, modifiers: Modifiers) -> Result<Self> {
        let expected = expected.into();
        let case_insensitive = modifiers.is_case_insensitive();

        let regex = if modifiers.is_regexp() {
            // Validate the bare pattern: wrapping can hide unbalanced groups.
            Regex::new(&expected).map_err(|source| Error::InvalidRegexp {
                pattern: expected.clone(),
                source,
            })?;
            let pattern = match mode {
                MatchMode::Substring => expected.clone(),
                MatchMode::Exact => format!("^(?:{})$", expected),
            };
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|source| Error::InvalidRegexp {
                    pattern: expected.clone(),
                    source,
                })?;
            Some(regex)
        } else {
            None
        };

        Ok(Self {
            expected,
            mode,
            case_insensitive,
            regex,
        })
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn is_match(&self, subject: &str) -> bool {
        if let Some(regex) = &self.regex {
            return regex.is_match(subject);
        }

        if self.case_insensitive {
            let subject = subject.to_lowercase();
            let expected = self.expected.to_lowercase();
            match self.mode {
                MatchMode::Substring => subject.contains(&expected),
                MatchMode::Exact => subject == expected,
            }
        } else {
            match self.mode {
                MatchMode::Substring => subject.contains(&self.expected),
                MatchMode::Exact => subject == self.expected,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum AssertKind {
    /// Implicit check attached to every request: status code in `[200, 300)`.
    Default,
    StatusCode(u16),
    Contains(TextMatcher),
    ContainsNot(TextMatcher),
    Equals(TextMatcher),
    Empty,
    Header {
        name: String,
        value: Option<TextMatcher>,
    },
}

impl AssertKind {
    pub fn command(&self) -> &'static str {
        match self {
            AssertKind::Default => "default",
            AssertKind::StatusCode(_) => "assert-status-code",
            AssertKind::Contains(_) => "assert-contains",
            AssertKind::ContainsNot(_) => "assert-contains-not",
            AssertKind::Equals(_) => "assert-equals",
            AssertKind::Empty => "assert-empty",
            AssertKind::Header { .. } => "assert-header",
        }
    }

    fn on_test(&self, page: &PageResult) -> bool {
        match self {
            AssertKind::Default => (200..300).contains(&page.status_code()),
            AssertKind::StatusCode(expected) => page.status_code() == *expected,
            AssertKind::Contains(matcher) | AssertKind::Equals(matcher) => {
                matcher.is_match(page.body())
            }
            AssertKind::ContainsNot(matcher) => !matcher.is_match(page.body()),
            AssertKind::Empty => page.body().is_empty(),
            AssertKind::Header { name, value } => page.headers().iter().any(|line| {
                let (line_name, line_value) = split_header(line);
                line_name.eq_ignore_ascii_case(name)
                    && value.as_ref().map_or(true, |m| m.is_match(line_value))
            }),
        }
    }

    fn on_fail(&self, page: &PageResult, negated: bool) -> String {
        match self {
            AssertKind::Default => format!(
                "Failed asserting that status code {} is successful (2xx)",
                page.status_code()
            ),
            AssertKind::StatusCode(expected) => format!(
                "Failed asserting that status code {} {} {}",
                page.status_code(),
                verb(negated, "equals", "does not equal"),
                expected
            ),
            AssertKind::Contains(matcher) => format!(
                "Failed asserting that response body {} {}",
                verb(negated, "contains", "does not contain"),
                quote(matcher.expected())
            ),
            AssertKind::ContainsNot(matcher) => format!(
                "Failed asserting that response body does not contain {}",
                quote(matcher.expected())
            ),
            AssertKind::Equals(matcher) => format!(
                "Failed asserting that response body {} {} {}",
                quote(&excerpt(page.body())),
                verb(negated, "equals", "does not equal"),
                quote(matcher.expected())
            ),
            AssertKind::Empty => format!(
                "Failed asserting that response body {}",
                verb(negated, "is empty", "is not empty")
            ),
            AssertKind::Header { name, value } => {
                let expected = match value {
                    Some(m) => format!("{}: {}", name, m.expected()),
                    None => name.clone(),
                };
                format!(
                    "Failed asserting that response headers {} {} {}",
                    quote_list(page.headers()),
                    verb(negated, "contain", "do not contain"),
                    quote(&expected)
                )
            }
        }
    }

    fn allowed_modifiers(&self) -> Modifiers {
        match self {
            AssertKind::Default => Modifiers::NONE,
            AssertKind::StatusCode(_) | AssertKind::Empty => Modifiers::NOT,
            AssertKind::ContainsNot(_) => CONTAINS_NOT_MODIFIERS,
            AssertKind::Contains(_) | AssertKind::Equals(_) | AssertKind::Header { .. } => {
                Modifiers::ALL
            }
        }
    }
}

/// A single check of a test case.
#[derive(Debug, Clone)]
pub struct Assert {
    location: Location,
    modifiers: Modifiers,
    kind: AssertKind,
}

impl Assert {
    /// Builds an assertion, rejecting modifiers outside the variant's
    /// allow-list.
    pub fn new(location: Location, kind: AssertKind, modifiers: Modifiers) -> Result<Self> {
        check_allowed(kind.command(), kind.allowed_modifiers(), modifiers)?;
        Ok(Self {
            location,
            modifiers,
            kind,
        })
    }

    pub fn success_status(location: Location) -> Self {
        Self {
            location,
            modifiers: Modifiers::NONE,
            kind: AssertKind::Default,
        }
    }

    pub fn status_code(location: Location, expected: u16, modifiers: Modifiers) -> Result<Self> {
        if !(100..=599).contains(&expected) {
            return Err(Error::InvalidStatusCode(expected));
        }
        Self::new(location, AssertKind::StatusCode(expected), modifiers)
    }

    pub fn contains(location: Location, expected: &str, modifiers: Modifiers) -> Result<Self> {
        let matcher = TextMatcher::new(expected, MatchMode::Substring, modifiers)?;
        Self::new(location, AssertKind::Contains(matcher), modifiers)
    }

    pub fn contains_not(location: Location, expected: &str, modifiers: Modifiers) -> Result<Self> {
        check_allowed("assert-contains-not", CONTAINS_NOT_MODIFIERS, modifiers)?;
        let matcher = TextMatcher::new(expected, MatchMode::Substring, modifiers)?;
        Self::new(location, AssertKind::ContainsNot(matcher), modifiers)
    }

    pub fn equals(location: Location, expected: &str, modifiers: Modifiers) -> Result<Self> {
        let matcher = TextMatcher::new(expected, MatchMode::Exact, modifiers)?;
        Self::new(location, AssertKind::Equals(matcher), modifiers)
    }

    pub fn empty(location: Location, modifiers: Modifiers) -> Result<Self> {
        Self::new(location, AssertKind::Empty, modifiers)
    }

    /// `header` is either a bare name (`Content-Type`) or `Name: value`.
    pub fn header(location: Location, header: &str, modifiers: Modifiers) -> Result<Self> {
        let (name, value) = match header.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (header.trim(), None),
        };
        if name.is_empty() {
            return Err(Error::InvalidHeader(header.to_string()));
        }
        let value = match value.filter(|v| !v.is_empty()) {
            Some(v) => Some(TextMatcher::new(v, MatchMode::Exact, modifiers)?),
            None => None,
        };
        Self::new(
            location,
            AssertKind::Header {
                name: name.to_string(),
                value,
            },
            modifiers,
        )
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn kind(&self) -> &AssertKind {
        &self.kind
    }

    pub fn command(&self) -> &'static str {
        self.kind.command()
    }

    pub fn test(&self, page: &PageResult) -> AssertResult<'_> {
        let mut success = self.kind.on_test(page);
        if self.modifiers.is_not() {
            success = !success;
        }

        if success {
            AssertResult {
                assert: self,
                success: true,
                error: String::new(),
            }
        } else {
            let message = self.kind.on_fail(page, self.modifiers.is_not());
            AssertResult {
                assert: self,
                success: false,
                error: format!("{}{}", message, self.modifiers.suffix()),
            }
        }
    }
}

/// Outcome of evaluating one [`Assert`]. The error text is empty iff the
/// assertion succeeded.
#[derive(Debug, Clone)]
pub struct AssertResult<'a> {
    assert: &'a Assert,
    success: bool,
    error: String,
}

impl<'a> AssertResult<'a> {
    pub fn assert(&self) -> &'a Assert {
        self.assert
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

fn check_allowed(command: &'static str, allowed: Modifiers, modifiers: Modifiers) -> Result<()> {
    let disallowed = modifiers.without(allowed);
    if disallowed.is_empty() {
        Ok(())
    } else {
        Err(Error::NotAllowedModifier {
            command,
            modifiers: disallowed,
        })
    }
}

fn split_header(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}

fn verb(negated: bool, positive: &'static str, negative: &'static str) -> &'static str {
    if negated {
        negative
    } else {
        positive
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text)
}

fn quote_list(items: &[String]) -> String {
    if items.is_empty() {
        return quote("");
    }
    items
        .iter()
        .map(|item| quote(item))
        .collect::<Vec<_>>()
        .join(", ")
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
