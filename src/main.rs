//! mdpage - Markdown to self-contained HTML page converter

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt};

use mdpage::ConvertOptions;

#[derive(Parser)]
#[command(name = "mdpage")]
#[command(
    version,
    about = "Convert a Markdown file into a single HTML page with an embedded font, logo, images and a sidebar table of contents",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    mdpage docs/manual.md manual.html    Convert manual.md, looking up docs/font/Arial.ttf,
                                         docs/image/logo.png and relative images under docs/
    mdpage -v docs/manual.md manual.html Same, with debug logging (-vv for trace)
    mdpage -q docs/manual.md manual.html Same, reporting only warnings and errors")]
struct Cli {
    /// Input Markdown file (optionally starting with YAML front matter)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output HTML file, overwritten if it exists
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "mdpage=warn",
        (false, 0) => "mdpage=info",
        (false, 1) => "mdpage=debug",
        (false, _) => "mdpage=trace",
    };

    fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    mdpage::convert_file(&cli.input, &cli.output, &ConvertOptions::default())
        .wrap_err_with(|| {
            format!(
                "failed to convert {} into {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;
    Ok(())
}
