use std::io::{self, Write};
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use webunit_core::{AssertResult, TestSuiteResult};
use webunit_dsl::ParseError;

const DOTS_PER_LINE: usize = 80;

/// Console report: progress while running, then parse errors or failures
/// and a summary.
pub struct Output<W: WriteColor = StandardStream> {
    out: W,
    dot_count: usize,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::with_writer(StandardStream::stdout(color_choice))
    }
}

impl<W: WriteColor> Output<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out, dot_count: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_color(&mut self, color: Color) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(Some(color)))
    }

    fn set_bold(&mut self, color: Color) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))
    }

    fn mark(&mut self, success: bool, pass: &str, fail: &str) -> io::Result<()> {
        if success {
            self.set_color(Color::Green)?;
            write!(self.out, "{}", pass)?;
        } else {
            self.set_color(Color::Red)?;
            write!(self.out, "{}", fail)?;
        }
        self.out.reset()
    }

    /// Reports one evaluated assertion.
    pub fn print_progress(&mut self, result: &AssertResult<'_>, verbose: bool) -> io::Result<()> {
        if verbose {
            let assert = result.assert();
            self.mark(result.is_success(), "✓", "✗")?;
            writeln!(
                self.out,
                " {} {}{}",
                assert.location(),
                assert.command(),
                assert.modifiers().suffix()
            )?;
        } else {
            self.mark(result.is_success(), ".", "F")?;
            self.dot_count += 1;
            if self.dot_count >= DOTS_PER_LINE {
                writeln!(self.out)?;
                self.dot_count = 0;
            }
        }
        self.out.flush()
    }

    pub fn finish_progress(&mut self) -> io::Result<()> {
        if self.dot_count > 0 {
            writeln!(self.out)?;
            self.dot_count = 0;
        }
        Ok(())
    }

    pub fn print_parse_errors(&mut self, errors: &[ParseError]) -> io::Result<()> {
        self.set_bold(Color::Red)?;
        writeln!(self.out, "Parse errors:")?;
        self.out.reset()?;

        for error in errors {
            writeln!(self.out, "{}: {}", error.location(), error)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "{} parse error(s), no test was run.", errors.len())
    }

    pub fn print_results(&mut self, result: &TestSuiteResult<'_>, elapsed: Duration) -> io::Result<()> {
        let failed = result.failed_results();
        if !failed.is_empty() {
            writeln!(self.out)?;
            self.set_bold(Color::Red)?;
            writeln!(self.out, "Failures:")?;
            self.out.reset()?;

            for test_case_result in failed {
                if let Some(assert_result) = test_case_result.failed_assert() {
                    writeln!(
                        self.out,
                        "{}: {}",
                        assert_result.assert().location(),
                        assert_result.error()
                    )?;
                }
            }
        }

        writeln!(self.out)?;
        let elapsed = format!(" in {:.2}s", elapsed.as_secs_f64());
        if result.is_success() {
            self.set_bold(Color::Green)?;
            write!(self.out, "All {} test case(s) passed", result.total_count())?;
            self.out.reset()?;
            writeln!(self.out, "{}", elapsed)
        } else {
            self.set_bold(Color::Red)?;
            write!(self.out, "Summary:")?;
            self.out.reset()?;
            writeln!(
                self.out,
                " {} test case(s), {} failed, {} successful{}",
                result.total_count(),
                result.failed_count(),
                result.successful_count(),
                elapsed
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;
    use webunit_core::{PageResult, Request};
    use webunit_dsl::{parse_content, ParseContext};

    fn output() -> Output<NoColor<Vec<u8>>> {
        Output::with_writer(NoColor::new(Vec::new()))
    }

    fn text(output: Output<NoColor<Vec<u8>>>) -> String {
        String::from_utf8(output.into_inner().into_inner()).unwrap()
    }

    fn fetch(request: &Request) -> PageResult {
        if request.url().path() == "/ok" {
            PageResult::new(200, vec![], "hello")
        } else {
            PageResult::new(500, vec![], "")
        }
    }

    const SUITE: &str = "get http://localhost/ok\n\
                         assert-contains hello ~\n\
                         get http://localhost/broken\n\
                         assert-empty\n";

    #[test]
    fn test_progress_dots_and_failures() {
        let suite = parse_content(SUITE, "site.webunit", ParseContext::new())
            .into_suite()
            .unwrap();
        let mut out = output();
        let mut progress = Ok(());
        let result = suite.run_with(&fetch, &mut |r| {
            if progress.is_ok() {
                progress = out.print_progress(r, false);
            }
        });
        progress.unwrap();
        out.finish_progress().unwrap();
        out.print_results(&result, Duration::from_millis(1500)).unwrap();

        assert_eq!(
            text(out),
            "..F\n\
             \n\
             Failures:\n\
             site.webunit:3: Failed asserting that status code 500 is successful (2xx)\n\
             \n\
             Summary: 2 test case(s), 1 failed, 1 successful in 1.50s\n"
        );
    }

    #[test]
    fn test_verbose_progress() {
        let suite = parse_content(SUITE, "site.webunit", ParseContext::new())
            .into_suite()
            .unwrap();
        let mut out = output();
        let mut progress = Ok(());
        suite.run_with(&fetch, &mut |r| {
            if progress.is_ok() {
                progress = out.print_progress(r, true);
            }
        });
        progress.unwrap();

        assert_eq!(
            text(out),
            "✓ site.webunit:1 default\n\
             ✓ site.webunit:2 assert-contains (case insensitive)\n\
             ✗ site.webunit:3 default\n"
        );
    }

    #[test]
    fn test_all_passed_summary() {
        let suite = parse_content("get http://localhost/ok", "site.webunit", ParseContext::new())
            .into_suite()
            .unwrap();
        let result = suite.run(&fetch);
        let mut out = output();
        out.print_results(&result, Duration::ZERO).unwrap();
        assert_eq!(text(out), "\nAll 1 test case(s) passed in 0.00s\n");
    }

    #[test]
    fn test_parse_error_listing() {
        let parsed = parse_content(
            "get http://localhost/\nfoo\nassert-status-code 99\n",
            "site.webunit",
            ParseContext::new(),
        );
        let mut out = output();
        out.print_parse_errors(parsed.errors()).unwrap();
        let text = text(out);
        assert!(text.starts_with("Parse errors:\nsite.webunit:2: Syntax error: Invalid command foo.\n"));
        assert!(text.contains("site.webunit:3: Invalid argument: "));
        assert!(text.ends_with("2 parse error(s), no test was run.\n"));
    }
}
