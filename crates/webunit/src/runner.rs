use crate::cli::Cli;
use crate::error::Error;
use crate::fetcher::HttpFetcher;
use crate::output::Output;
use std::time::{Duration, Instant};
use tracing::debug;
use webunit_dsl::{parse_file, ParseContext};

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    NoTestCases,
    Usage,
    UnreadableFile,
    ParseErrors,
    TestFailures,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::NoTestCases => 1,
            Status::Usage => 2,
            Status::UnreadableFile => 3,
            Status::ParseErrors => 4,
            Status::TestFailures => 5,
        }
    }
}

/// Exit status for a command-line parsing error. Help and version output
/// are not failures.
pub fn usage_status(error: &clap::Error) -> Status {
    if error.use_stderr() {
        Status::Usage
    } else {
        Status::Success
    }
}

/// Parses the test file, runs it if it is valid and prints the report.
pub fn run(cli: &Cli) -> anyhow::Result<Status> {
    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);
    let mut output = Output::new(use_color);

    let context = ParseContext::with_variables(cli.variables.iter().cloned());
    let parsed = match parse_file(&cli.test_file, context) {
        Ok(parsed) => parsed,
        Err(source) => {
            let error = Error::ReadTestFile {
                path: cli.test_file.clone(),
                source,
            };
            eprintln!("{}", error);
            return Ok(Status::UnreadableFile);
        }
    };

    let suite = match parsed.into_suite() {
        Ok(suite) => suite,
        Err(errors) => {
            output.print_parse_errors(&errors)?;
            return Ok(Status::ParseErrors);
        }
    };

    if suite.is_empty() {
        eprintln!("No test cases found in {}", cli.test_file.display());
        return Ok(Status::NoTestCases);
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout), cli.follow_redirects)?;
    let start_time = Instant::now();

    let mut progress = Ok(());
    let result = suite.run_with(&fetcher, &mut |assert_result| {
        if progress.is_ok() {
            progress = output.print_progress(assert_result, cli.verbose);
        }
    });
    progress?;
    output.finish_progress()?;

    let elapsed = start_time.elapsed();
    debug!(elapsed_ms = elapsed.as_millis() as u64, "run finished");
    output.print_results(&result, elapsed)?;

    Ok(if result.is_success() {
        Status::Success
    } else {
        Status::TestFailures
    })
}
