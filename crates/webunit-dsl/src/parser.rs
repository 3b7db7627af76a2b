//! Line-oriented command dispatcher.
//!
//! Every non-blank line is one command. Malformed lines produce a
//! [`ParseError`] and parsing continues with the next line, so a single run
//! reports every defect of a file.

use crate::context::ParseContext;
use crate::value::{tokenize, Token, TokenizeError, ValueError, ValueParser};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use url::Url;
use webunit_core::{Assert, Location, Method, Modifiers, RequestModifier, TestCase, TestSuite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    Syntax,
    InvalidArgument,
    ExtraArgument,
    MissingVariable,
    InvalidVariable,
    DuplicateModifier,
    InvalidModifier,
    InvalidRequestModifier,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::Syntax => "Syntax error",
            ParseErrorKind::InvalidArgument => "Invalid argument",
            ParseErrorKind::ExtraArgument => "Extra argument",
            ParseErrorKind::MissingVariable => "Missing variable",
            ParseErrorKind::InvalidVariable => "Invalid variable",
            ParseErrorKind::DuplicateModifier => "Duplicate modifier",
            ParseErrorKind::InvalidModifier => "Invalid modifier",
            ParseErrorKind::InvalidRequestModifier => "Invalid request modifier",
        };
        f.write_str(text)
    }
}

/// A diagnostic for one line of a test file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ParseError {
    location: Location,
    kind: ParseErrorKind,
    message: String,
}

impl ParseError {
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The parsed suite plus every error found. Only a result without errors
/// may be run.
#[derive(Debug, Clone)]
pub struct ParseResult {
    suite: TestSuite,
    errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_suite(self) -> Result<TestSuite, Vec<ParseError>> {
        if self.errors.is_empty() {
            Ok(self.suite)
        } else {
            Err(self.errors)
        }
    }
}

// ============ Commands ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssertCommand {
    StatusCode,
    Contains,
    ContainsNot,
    Equals,
    Empty,
    Header,
}

impl AssertCommand {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "assert-status-code" => Some(AssertCommand::StatusCode),
            "assert-contains" => Some(AssertCommand::Contains),
            "assert-contains-not" => Some(AssertCommand::ContainsNot),
            "assert-equals" => Some(AssertCommand::Equals),
            "assert-empty" => Some(AssertCommand::Empty),
            "assert-header" => Some(AssertCommand::Header),
            _ => None,
        }
    }

    fn arguments(self) -> &'static [&'static str] {
        match self {
            AssertCommand::StatusCode => &["status code"],
            AssertCommand::Empty => &[],
            AssertCommand::Header => &["header"],
            AssertCommand::Contains | AssertCommand::ContainsNot | AssertCommand::Equals => {
                &["text"]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierCommand {
    Header,
    PostParameter,
    PostFile,
    RawContent,
}

impl ModifierCommand {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "with-header" => Some(ModifierCommand::Header),
            "with-post-parameter" => Some(ModifierCommand::PostParameter),
            "with-post-file" => Some(ModifierCommand::PostFile),
            "with-raw-content" => Some(ModifierCommand::RawContent),
            _ => None,
        }
    }

    fn arguments(self) -> &'static [&'static str] {
        match self {
            ModifierCommand::Header => &["header"],
            ModifierCommand::PostParameter => &["name", "value"],
            ModifierCommand::PostFile => &["name", "path"],
            ModifierCommand::RawContent => &["content"],
        }
    }
}

// ============ Line errors ============

#[derive(Debug)]
struct LineError {
    kind: ParseErrorKind,
    message: String,
}

impl LineError {
    fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<webunit_core::Error> for LineError {
    fn from(error: webunit_core::Error) -> Self {
        use webunit_core::Error;

        let kind = match error {
            Error::NotAllowedModifier { .. } => ParseErrorKind::InvalidModifier,
            Error::IncompatibleRequestModifier { .. }
            | Error::MethodNotAllowedForRequestModifier { .. } => {
                ParseErrorKind::InvalidRequestModifier
            }
            Error::EmptyParameterName
            | Error::InvalidFilePath(_)
            | Error::FileNotFound(_)
            | Error::InvalidHeader(_)
            | Error::InvalidStatusCode(_)
            | Error::InvalidRegexp { .. } => ParseErrorKind::InvalidArgument,
        };
        LineError::new(kind, error.to_string())
    }
}

impl From<ValueError> for LineError {
    fn from(error: ValueError) -> Self {
        let kind = match error {
            ValueError::MissingVariable(_) => ParseErrorKind::MissingVariable,
            ValueError::Tokenize(_) => ParseErrorKind::Syntax,
        };
        LineError::new(kind, error.to_string())
    }
}

impl From<TokenizeError> for LineError {
    fn from(error: TokenizeError) -> Self {
        LineError::new(ParseErrorKind::Syntax, error.to_string())
    }
}

type LineResult<T = ()> = Result<T, LineError>;

// ============ Parser ============

/// What subsequent `assert-*` and `with-*` lines attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    /// No request line seen yet.
    Missing,
    /// The last test case of the suite.
    Open,
    /// The last request line was malformed; attachments are checked but
    /// dropped.
    Broken,
}

pub struct Parser {
    path: PathBuf,
    context: ParseContext,
    suite: TestSuite,
    errors: Vec<ParseError>,
    current: Current,
}

impl Parser {
    pub fn new(path: impl Into<PathBuf>, context: ParseContext) -> Self {
        Self {
            path: path.into(),
            context,
            suite: TestSuite::new(),
            errors: Vec::new(),
            current: Current::Missing,
        }
    }

    pub fn parse(mut self, content: &str) -> ParseResult {
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let location = Location::new(self.path.clone(), index + 1);
            if let Err(error) = self.parse_line(line, &location) {
                self.errors.push(ParseError {
                    location,
                    kind: error.kind,
                    message: error.message,
                });
            }
        }

        debug!(
            path = %self.path.display(),
            test_cases = self.suite.len(),
            errors = self.errors.len(),
            "parsed test file"
        );

        ParseResult {
            suite: self.suite,
            errors: self.errors,
        }
    }

    fn parse_line(&mut self, line: &str, location: &Location) -> LineResult {
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        if let Some(method) = Method::from_keyword(keyword) {
            return self.parse_request(method, keyword, rest, location);
        }
        if let Some(command) = AssertCommand::from_keyword(keyword) {
            return self.parse_assert(command, keyword, rest, location);
        }
        if let Some(command) = ModifierCommand::from_keyword(keyword) {
            return self.parse_request_modifier(command, keyword, rest);
        }

        match keyword {
            "set" => self.parse_set(keyword, rest, false),
            "set-default" => self.parse_set(keyword, rest, true),
            _ => Err(LineError::new(
                ParseErrorKind::Syntax,
                format!("Invalid command {}.", keyword),
            )),
        }
    }

    fn parse_request(
        &mut self,
        method: Method,
        keyword: &str,
        rest: &str,
        location: &Location,
    ) -> LineResult {
        self.current = Current::Broken;

        let tokens = tokenize(rest)?;
        let (args, extra) = split_arguments(keyword, &tokens, &["URL"])?;
        reject_extra(keyword, extra)?;

        let url = self.value(&args[0])?;
        let url = Url::parse(&url).map_err(|e| {
            LineError::new(
                ParseErrorKind::InvalidArgument,
                format!("Invalid URL \"{}\": {}.", url, e),
            )
        })?;

        let mut test_case = TestCase::new(location.clone(), method, url);
        test_case.add_assert(Assert::success_status(location.clone()));
        self.suite.add_test_case(test_case);
        self.current = Current::Open;
        Ok(())
    }

    fn parse_set(&mut self, keyword: &str, rest: &str, only_default: bool) -> LineResult {
        let Some((name, value)) = rest.split_once('=') else {
            return Err(LineError::new(
                ParseErrorKind::Syntax,
                format!("Missing \"=\" in {} command.", keyword),
            ));
        };

        let name = name.trim();
        if !ParseContext::is_valid_name(name) {
            return Err(LineError::new(
                ParseErrorKind::InvalidVariable,
                format!("Invalid variable name \"{}\".", name),
            ));
        }

        let tokens = tokenize(value)?;
        let (args, extra) = split_arguments(keyword, &tokens, &["value"])?;
        reject_extra(keyword, extra)?;
        let value = self.value(&args[0])?;

        if only_default {
            self.context.set_default(name, value);
        } else {
            self.context.set(name, value);
        }
        Ok(())
    }

    fn parse_assert(
        &mut self,
        command: AssertCommand,
        keyword: &str,
        rest: &str,
        location: &Location,
    ) -> LineResult {
        self.require_test_case(keyword)?;

        let tokens = tokenize(rest)?;
        let (args, extra) = split_arguments(keyword, &tokens, command.arguments())?;
        let location = location.clone();

        let assert = match command {
            AssertCommand::Header => {
                let (header, extra) = self.header_argument(&args[0], extra, true)?;
                let modifiers = parse_modifiers(keyword, extra)?;
                Assert::header(location, &header, modifiers)?
            }
            AssertCommand::Empty => Assert::empty(location, parse_modifiers(keyword, extra)?)?,
            AssertCommand::StatusCode => {
                let modifiers = parse_modifiers(keyword, extra)?;
                let raw = self.value(&args[0])?;
                let code = raw.parse::<u16>().map_err(|_| {
                    LineError::new(
                        ParseErrorKind::InvalidArgument,
                        format!("Invalid status code \"{}\".", raw),
                    )
                })?;
                Assert::status_code(location, code, modifiers)?
            }
            AssertCommand::Contains => {
                let modifiers = parse_modifiers(keyword, extra)?;
                Assert::contains(location, &self.value(&args[0])?, modifiers)?
            }
            AssertCommand::ContainsNot => {
                let modifiers = parse_modifiers(keyword, extra)?;
                Assert::contains_not(location, &self.value(&args[0])?, modifiers)?
            }
            AssertCommand::Equals => {
                let modifiers = parse_modifiers(keyword, extra)?;
                Assert::equals(location, &self.value(&args[0])?, modifiers)?
            }
        };

        if self.current == Current::Open {
            if let Some(test_case) = self.suite.last_mut() {
                test_case.add_assert(assert);
            }
        }
        Ok(())
    }

    fn parse_request_modifier(
        &mut self,
        command: ModifierCommand,
        keyword: &str,
        rest: &str,
    ) -> LineResult {
        self.require_test_case(keyword)?;

        let tokens = tokenize(rest)?;
        let (args, extra) = split_arguments(keyword, &tokens, command.arguments())?;

        let modifier = match command {
            ModifierCommand::Header => {
                let (header, extra) = self.header_argument(&args[0], extra, false)?;
                reject_extra(keyword, extra)?;
                RequestModifier::header(&header)?
            }
            ModifierCommand::PostParameter => {
                reject_extra(keyword, extra)?;
                RequestModifier::post_parameter(self.value(&args[0])?, self.value(&args[1])?)?
            }
            ModifierCommand::PostFile => {
                reject_extra(keyword, extra)?;
                RequestModifier::post_file(self.value(&args[0])?, self.value(&args[1])?)?
            }
            ModifierCommand::RawContent => {
                reject_extra(keyword, extra)?;
                RequestModifier::raw_content(self.value(&args[0])?)
            }
        };

        if self.current == Current::Open {
            if let Some(test_case) = self.suite.last_mut() {
                test_case.add_request_modifier(modifier)?;
            }
        }
        Ok(())
    }

    fn require_test_case(&self, keyword: &str) -> LineResult {
        if self.current == Current::Missing {
            return Err(LineError::new(
                ParseErrorKind::Syntax,
                format!("Command {} must follow a request command.", keyword),
            ));
        }
        Ok(())
    }

    fn value(&self, token: &Token<'_>) -> LineResult<String> {
        Ok(ValueParser::new(&self.context).parse_text(token.raw())?)
    }

    /// Resolves a header argument. `Name: value` may be one token or a
    /// `Name:` token followed by the value token.
    fn header_argument<'t, 'a>(
        &self,
        first: &Token<'a>,
        rest: &'t [Token<'a>],
        stop_at_modifier: bool,
    ) -> LineResult<(String, &'t [Token<'a>])> {
        let header = self.value(first)?;
        if header.ends_with(':') {
            if let Some((value, remaining)) = rest.split_first() {
                if !(stop_at_modifier && value.modifier().is_some()) {
                    let value = self.value(value)?;
                    return Ok((format!("{} {}", header, value), remaining));
                }
            }
        }
        Ok((header, rest))
    }
}

fn split_arguments<'t, 'a>(
    keyword: &str,
    tokens: &'t [Token<'a>],
    names: &[&str],
) -> LineResult<(&'t [Token<'a>], &'t [Token<'a>])> {
    if let Some(missing) = names.get(tokens.len()) {
        return Err(LineError::new(
            ParseErrorKind::InvalidArgument,
            format!("Missing argument {} for {}.", missing, keyword),
        ));
    }
    Ok(tokens.split_at(names.len()))
}

fn reject_extra(keyword: &str, extra: &[Token<'_>]) -> LineResult {
    match extra.first() {
        Some(token) => Err(extra_argument(keyword, token)),
        None => Ok(()),
    }
}

fn extra_argument(keyword: &str, token: &Token<'_>) -> LineError {
    LineError::new(
        ParseErrorKind::ExtraArgument,
        format!("Unexpected argument {} for {}.", token.raw(), keyword),
    )
}

/// Reads trailing modifier tokens left to right.
fn parse_modifiers(keyword: &str, tokens: &[Token<'_>]) -> LineResult<Modifiers> {
    let mut modifiers = Modifiers::NONE;
    for token in tokens {
        let Some(flag) = token.modifier() else {
            return Err(extra_argument(keyword, token));
        };
        if modifiers.contains(flag) {
            return Err(LineError::new(
                ParseErrorKind::DuplicateModifier,
                format!("Modifier {} given more than once for {}.", token.raw(), keyword),
            ));
        }
        modifiers = modifiers | flag;
    }
    Ok(modifiers)
}

/// Parses `content` as the test file at `path`.
pub fn parse_content(content: &str, path: impl Into<PathBuf>, context: ParseContext) -> ParseResult {
    Parser::new(path, context).parse(content)
}
