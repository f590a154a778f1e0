use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use keytally::config::{resolve_path, RunConfig};
use keytally::error::KeyTallyError;
use keytally::run::{tally_corpus, write_outputs, CorpusTally, Progress};
use std::io::{self, Write};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod reports;

/// Tallies (key name, key code) pairs and single-character samples over a
/// corpus of tab-separated keystroke logs.
#[derive(Parser, Debug)]
#[command(name = "dfko", author, version, about, long_about = None)]
struct Cli {
    /// Keystroke log file, or directory searched recursively.
    path_src: String,

    /// Existing directory that receives the output files.
    dpath_dest: String,

    /// Glob patterns matched against paths relative to PATH_SRC (default: all files).
    /// Put patterns that begin with '-' after `--`.
    patterns: Vec<String>,

    #[command(flatten)]
    run: RunConfig,

    /// JSON file with run settings; explicit flags take precedence.
    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_cli() -> (Cli, ArgMatches) {
    let matches = Cli::command().try_get_matches().unwrap_or_else(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => {
            let _ = e.print();
            process::exit(1);
        }
    });
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(1);
    });
    (cli, matches)
}

fn resolve_config(cli: &Cli, matches: &ArgMatches) -> Result<RunConfig, KeyTallyError> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading run settings from {}", path);
            let mut file_config = RunConfig::load_from_file(resolve_path(path))?;
            file_config.merge_from_cli(&cli.run, matches);
            file_config
        }
        None => cli.run.clone(),
    };
    config.validate()?;
    Ok(config)
}

/// Writes diagnostic lines to stderr, then exits with status 1.
///
/// A closed stderr ends the run silently with status 0.
fn fail(lines: &[String]) -> ! {
    let mut err = io::stderr().lock();
    for line in lines {
        if let Err(e) = writeln!(err, "{}", line) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                process::exit(0);
            }
            break;
        }
    }
    process::exit(1);
}

fn print_summary(tally: &CorpusTally, config: &RunConfig) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "files: {}", tally.files)?;
    writeln!(out)?;
    if config.top > 0 {
        writeln!(out, "{}", reports::top_pairs(&tally.counter, config.top))?;
    }
    out.flush()
}

fn main() {
    let (cli, matches) = parse_cli();
    init_tracing(cli.debug);

    let config = resolve_config(&cli, &matches)
        .unwrap_or_else(|e| fail(&[format!("Error: {}", e)]));

    let path_src = resolve_path(&cli.path_src);
    let dpath_dest = resolve_path(&cli.dpath_dest);

    if !dpath_dest.is_dir() {
        fail(&[format!(
            "Error: '{}' is not a valid directory",
            dpath_dest.display()
        )]);
    }

    info!("Scanning {}", path_src.display());
    let mut progress = Progress::new(io::stderr(), config.progress_interval);
    let tally = match tally_corpus(&path_src, &cli.patterns, &mut progress) {
        Ok(tally) => tally,
        Err(KeyTallyError::InFile { root, name, source }) => {
            debug!("Run aborted in {}", name);
            fail(&[
                format!("Error: path_src: '{}', name: {}", root, name),
                source.to_string(),
            ]);
        }
        Err(e) => fail(&[format!("Error: {}", e)]),
    };

    if let Err(e) = write_outputs(&tally, &dpath_dest, &config) {
        fail(&[format!("Error: {}", e)]);
    }

    if let Err(e) = print_summary(&tally, &config) {
        // A reader that went away early is a normal way for a pipeline to end.
        if e.kind() == io::ErrorKind::BrokenPipe {
            process::exit(0);
        }
        fail(&[format!("Error: {}", e)]);
    }
}
