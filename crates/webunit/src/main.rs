use clap::Parser;
use tracing_subscriber::EnvFilter;
use webunit::cli::Cli;

fn main() -> anyhow::Result<()> {
    // Reset SIGPIPE handler to default (terminate) so piping to head/tail works correctly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let status = webunit::usage_status(&error);
            error.print()?;
            std::process::exit(status.code());
        }
    };

    let filter = EnvFilter::try_from_env("WEBUNIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let status = webunit::run(&cli)?;
    std::process::exit(status.code());
}
