use crate::assert::AssertResult;
use crate::page::PageFetcher;
use crate::test_case::{TestCase, TestCaseResult};
use tracing::debug;

/// The test cases of one test file, in file order.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    test_cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_test_case(&mut self, test_case: TestCase) {
        self.test_cases.push(test_case);
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn last_mut(&mut self) -> Option<&mut TestCase> {
        self.test_cases.last_mut()
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn run(&self, fetcher: &dyn PageFetcher) -> TestSuiteResult<'_> {
        self.run_with(fetcher, &mut |_| {})
    }

    /// Runs every test case in order; a failing test case does not stop
    /// the suite.
    pub fn run_with(
        &self,
        fetcher: &dyn PageFetcher,
        observer: &mut dyn FnMut(&AssertResult<'_>),
    ) -> TestSuiteResult<'_> {
        let results: Vec<_> = self
            .test_cases
            .iter()
            .map(|test_case| test_case.run_with(fetcher, &mut *observer))
            .collect();

        let suite_result = TestSuiteResult {
            suite: self,
            results,
        };
        debug!(
            total = suite_result.total_count(),
            failed = suite_result.failed_count(),
            "test suite finished"
        );
        suite_result
    }
}

#[derive(Debug, Clone)]
pub struct TestSuiteResult<'a> {
    suite: &'a TestSuite,
    results: Vec<TestCaseResult<'a>>,
}

impl<'a> TestSuiteResult<'a> {
    pub fn suite(&self) -> &'a TestSuite {
        self.suite
    }

    pub fn results(&self) -> &[TestCaseResult<'a>] {
        &self.results
    }

    /// Failed test case results, in file order.
    pub fn failed_results(&self) -> Vec<&TestCaseResult<'a>> {
        self.results.iter().filter(|r| !r.is_success()).collect()
    }

    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }

    pub fn successful_count(&self) -> usize {
        self.total_count() - self.failed_count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}
