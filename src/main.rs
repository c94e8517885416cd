// promptspec/src/main.rs

use anyhow::Result;
use clap::Parser;
use std::{env, path::PathBuf, process::ExitCode};

use promptspec::{Report, collect_prompt_files};

#[derive(Parser)]
#[command(
    name = "validate-prompts",
    version,
    about = "Validate prompt specification JSON files"
)]
struct Args {
    /// Prompt files to validate. When omitted, the root directory is
    /// scanned recursively for *.json files.
    files: Vec<PathBuf>,
    /// Directory scanned when no files are given
    #[arg(long, default_value = "prompts")]
    root: PathBuf,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let files = if args.files.is_empty() {
        let found = collect_prompt_files(&args.root);
        if found.is_empty() {
            // Nothing to validate is a success, not a failure.
            println!(
                "No prompt files found in {}. Nothing to validate.",
                args.root.display()
            );
            return Ok(ExitCode::SUCCESS);
        }
        found
    } else {
        args.files
    };

    let report = Report::run(&files);
    let base = env::current_dir()?;
    print!("{}", report.render(&base));

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
