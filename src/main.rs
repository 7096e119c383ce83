use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ignore::WalkBuilder;
use miette::{miette, IntoDiagnostic, Result};

use gdfmt::batch::{self, FileStatus, Mode};
use gdfmt::config::{load_config, Config};
use gdfmt::format::{run_formatter, FormatOptions};

#[derive(Parser)]
#[command(name = "gdfmt", version, about = "A fast GDScript formatter for Godot 4.x")]
struct Cli {
    /// Files or directories to format
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Check if files are formatted without modifying them
    #[arg(short, long)]
    check: bool,

    /// Show diff without modifying files
    #[arg(short, long)]
    diff: bool,

    /// Read from stdin, write to stdout
    #[arg(long)]
    stdin: bool,

    /// Maximum line length
    #[arg(short = 'l', long)]
    line_length: Option<usize>,

    /// Use spaces instead of tabs (specify number of spaces)
    #[arg(short = 's', long)]
    use_spaces: Option<usize>,

    /// Allow at most one blank line between top-level declarations
    #[arg(long)]
    single_blank_lines: bool,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip safety checks (AST equivalence and idempotence) - not recommended
    #[arg(long)]
    unsafe_skip_checks: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(unclean) => {
            if unclean {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).map_err(|e| miette!("{}", e))?;
    let options = config.format_options(cli.use_spaces, cli.line_length, cli.single_blank_lines);

    if cli.stdin {
        return format_stdin(&options, &cli);
    }

    let mode = if cli.check {
        Mode::Check
    } else if cli.diff {
        Mode::Diff
    } else {
        Mode::Write
    };

    let files = collect_files(&cli.paths, &config)?;
    let reports = batch::process_files(&files, &options, mode, cli.unsafe_skip_checks);

    for report in &reports {
        match &report.status {
            FileStatus::Unchanged => {}
            FileStatus::Changed => {
                match mode {
                    Mode::Write => println!("Formatted: {}", report.path.display()),
                    Mode::Check => println!("Would reformat: {}", report.path.display()),
                    Mode::Diff => {
                        if let Some(diff) = &report.diff {
                            print!("{}", diff);
                        }
                    }
                }
            }
            FileStatus::Failed(message) => {
                eprintln!("Error: {}: {}", report.path.display(), message);
            }
        }
        for line in &report.overlong_lines {
            eprintln!(
                "Warning: {}:{}: line exceeds {} columns and has no split point",
                report.path.display(),
                line,
                options.max_line_length
            );
        }
    }

    // Failures were already reported per file; a successful in-place rewrite
    // is a clean run.
    Ok(batch::needs_attention(&reports, mode))
}

fn format_stdin(options: &FormatOptions, cli: &Cli) -> Result<bool> {
    let mut source = String::new();
    io::stdin().read_to_string(&mut source).into_diagnostic()?;

    let outcome = run_formatter(&source, options).map_err(|e| miette!("{}", e))?;

    // Stdin has no skip-and-continue fallback; a failed check is fatal.
    if !cli.unsafe_skip_checks {
        batch::verify_ast_equivalence(&source, &outcome.text).map_err(|e| miette!("{}", e))?;
        batch::verify_idempotent(&outcome, options).map_err(|e| miette!("{}", e))?;
    }

    for line in &outcome.overlong_lines {
        eprintln!(
            "Warning: <stdin>:{}: line exceeds {} columns and has no split point",
            line, options.max_line_length
        );
    }

    if cli.check {
        return Ok(source != outcome.text);
    }
    if cli.diff {
        if source != outcome.text {
            print!("{}", batch::render_diff("<stdin>", &source, &outcome.text));
        }
        return Ok(source != outcome.text);
    }

    io::stdout()
        .write_all(outcome.text.as_bytes())
        .into_diagnostic()?;
    Ok(false)
}

fn collect_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            if !config.is_excluded(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            let walker = WalkBuilder::new(path).standard_filters(true).build();
            for entry in walker {
                let entry = entry.into_diagnostic()?;
                let file_path = entry.path();
                if file_path.extension().map(|e| e == "gd").unwrap_or(false)
                    && !config.is_excluded(file_path)
                {
                    files.push(file_path.to_path_buf());
                }
            }
        } else {
            return Err(miette!("path does not exist: {}", path.display()));
        }
    }
    Ok(files)
}
