use clap::Parser;
use std::path::PathBuf;
use webunit_dsl::ParseContext;

#[derive(Parser, Debug)]
#[command(name = "webunit", about = "Run plain-text HTTP tests", version)]
pub struct Cli {
    /// Test file to parse and run
    pub test_file: PathBuf,

    /// Define a variable for {NAME} substitution, overriding set-default
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub timeout: u64,

    /// Follow 3xx responses instead of reporting them
    #[arg(long)]
    pub follow_redirects: bool,

    /// Show each evaluated assertion instead of progress dots
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

fn parse_variable(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{}\"", arg))?;
    if !ParseContext::is_valid_name(name) {
        return Err(format!("invalid variable name \"{}\"", name));
    }
    Ok((name.to_string(), value.to_string()))
}
