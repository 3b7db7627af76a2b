//! Assertions, request modifiers and the execution engine of webunit.
//!
//! A [`TestSuite`] holds [`TestCase`]s, each of which owns an ordered list
//! of [`Assert`]s and [`RequestModifier`]s. Running a suite fetches one page
//! per test case through a [`PageFetcher`] and evaluates the assertions in
//! order, stopping a test case at its first failure.
//!
//! # Example
//!
//! ```
//! use webunit_core::{Assert, Location, Method, Modifiers, PageResult, Request, TestCase, TestSuite};
//! use url::Url;
//!
//! let location = Location::new("site.webunit", 1);
//! let url = Url::parse("http://localhost/").unwrap();
//! let mut case = TestCase::new(location.clone(), Method::Get, url);
//! case.add_assert(Assert::success_status(location.clone()));
//! case.add_assert(Assert::contains(location, "welcome", Modifiers::CASE_INSENSITIVE).unwrap());
//!
//! let mut suite = TestSuite::new();
//! suite.add_test_case(case);
//!
//! let fetcher = |_: &Request| PageResult::new(200, vec![], "Welcome home");
//! let result = suite.run(&fetcher);
//! assert_eq!(result.failed_count(), 0);
//! ```

pub mod assert;
pub mod error;
pub mod location;
pub mod modifiers;
pub mod page;
pub mod request_modifier;
pub mod test_case;
pub mod test_suite;

pub use assert::{Assert, AssertKind, AssertResult, MatchMode, TextMatcher};
pub use error::{Error, Result};
pub use location::Location;
pub use modifiers::Modifiers;
pub use page::{Method, PageFetcher, PageResult, Request, RequestBody};
pub use request_modifier::RequestModifier;
pub use test_case::{TestCase, TestCaseResult};
pub use test_suite::{TestSuite, TestSuiteResult};
