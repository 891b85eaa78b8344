//! CLI entry point for pathdigest

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process;

use clap::{Parser, ValueEnum};
use pathdigest::{
    DEFAULT_MAX_FILE_SIZE, DigestFormatter, IngestError, IngestionOptions, OutputConfig,
    RemoteSource, ingest, list_remote_branches, to_json,
};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "PATHDIGEST_LOG";

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            // The summary goes to stderr
            io::stderr().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pathdigest")]
#[command(about = "Turn a local directory, file or Git repository into a text digest")]
#[command(version)]
struct Args {
    /// Local directory, file, Git URL or user/repo slug
    source: String,

    /// Output file for the digest ("-" for stdout)
    #[arg(short, long, default_value = "pathdigest_digest.txt")]
    output: String,

    /// Maximum file size to include content for (e.g. 500K, 10M; 0 disables)
    #[arg(short = 's', long = "max-size", value_name = "SIZE", value_parser = parse_file_size)]
    max_size: Option<u64>,

    /// Additional exclude patterns (repeatable, comma-separated)
    #[arg(short = 'e', long = "exclude-pattern", value_delimiter = ',')]
    exclude_patterns: Vec<String>,

    /// Include patterns; when given, only matching files are processed
    #[arg(short = 'i', long = "include-pattern", value_delimiter = ',')]
    include_patterns: Vec<String>,

    /// Branch to clone for remote repositories
    #[arg(short, long)]
    branch: Option<String>,

    /// Write the digest as JSON instead of text
    #[arg(long = "json")]
    json: bool,

    /// List the remote's branches and exit
    #[arg(long = "list-branches")]
    list_branches: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = if args.list_branches {
        print_branches(&args.source)
    } else {
        run(&args)
    };

    if let Err(e) = result {
        eprintln!("pathdigest: {}", e);
        process::exit(1);
    }
}

fn print_branches(source: &str) -> pathdigest::Result<()> {
    let remote = RemoteSource::parse(source)?;
    for branch in list_remote_branches(&remote.url)? {
        println!("{}", branch);
    }
    Ok(())
}

fn run(args: &Args) -> pathdigest::Result<()> {
    let options = IngestionOptions::new(&args.source)
        .with_max_file_size(args.max_size.unwrap_or(DEFAULT_MAX_FILE_SIZE))
        .with_exclude_patterns(&args.exclude_patterns)
        .with_include_patterns(&args.include_patterns)
        .with_branch(args.branch.clone().unwrap_or_default());

    eprintln!("Processing source: {}", options.source);
    if let Some(branch) = &options.branch {
        eprintln!("Targeting branch: {}", branch);
    }

    let digest = ingest(&options)?;

    let formatter = DigestFormatter::new(OutputConfig {
        use_color: should_use_color(args.color),
    });
    let formatted = formatter.format(&digest, &options);

    let document = if args.json {
        to_json(&digest).map_err(|e| IngestError::Output {
            path: args.output.clone().into(),
            source: io::Error::other(e),
        })?
    } else {
        formatted.document()
    };

    write_document(&args.output, &document)?;

    formatter
        .print_summary(&formatted.summary)
        .map_err(|source| IngestError::Output {
            path: "<stderr>".into(),
            source,
        })
}

/// Write the digest to `output`, or to stdout when `output` is `-`.
fn write_document(output: &str, document: &str) -> pathdigest::Result<()> {
    if output == "-" {
        let mut stdout = io::stdout().lock();
        return stdout
            .write_all(document.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|source| IngestError::Output {
                path: output.into(),
                source,
            });
    }

    let path = Path::new(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::Output {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, document).map_err(|source| IngestError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    eprintln!("Digest written to: {}", output);
    Ok(())
}
