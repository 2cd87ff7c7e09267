use anyhow::{Context, Result};
use bpaf::Bpaf;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uafcheck::{analyze_source, render_report};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage)]
/// Use-after-free lint for C and C++ translation units
struct Opts {
    /// Source file to analyze
    #[bpaf(positional("FILE"))]
    file: PathBuf,

    /// Compiler flags after `--`; accepted for driver compatibility, not used by the parser
    #[bpaf(positional("CFLAGS"), many)]
    compiler_flags: Vec<String>,
}

fn main() -> Result<()> {
    let opts = opts().run();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if !opts.compiler_flags.is_empty() {
        tracing::debug!(flags = ?opts.compiler_flags, "ignoring compiler flags");
    }

    let source = fs::read_to_string(&opts.file)
        .with_context(|| format!("failed to read {}", opts.file.display()))?;

    let violations = analyze_source(&source)
        .with_context(|| format!("failed to analyze {}", opts.file.display()))?;

    print!("{}", render_report(&violations));

    // Findings are reported in the text; exit status stays 0 either way.
    Ok(())
}
