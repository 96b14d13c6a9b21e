#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use esdown_cli::args::{CliArgs, ReportFormat};
use esdown_cli::{driver, reporter::Reporter, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if ESDOWN_LOG or RUST_LOG is set (zero cost otherwise).
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let result = driver::run(&args, &cwd)?;

    if !result.stdout.is_empty() {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(result.stdout.as_bytes())
            .context("failed to write output")?;
        stdout.flush().context("failed to write output")?;
    }

    if args.check {
        for path in &result.changed {
            println!("{}", path.display());
        }
    }

    if !result.diagnostics.is_empty() {
        let pretty = args
            .pretty
            .unwrap_or_else(|| std::io::stderr().is_terminal());
        let mut reporter = Reporter::new(pretty && args.format == ReportFormat::Text);
        for (file, text) in &result.sources {
            reporter.add_source(file.as_str(), text.as_str());
        }
        let report = match args.format {
            ReportFormat::Text => reporter.render(&result.diagnostics),
            ReportFormat::Json => reporter.render_json(&result.diagnostics)?,
        };
        eprint!("{report}");
    }

    let failed = result.has_errors() || (args.check && !result.changed.is_empty());
    std::process::exit(if failed { EXIT_FAILURE } else { EXIT_SUCCESS });
}
