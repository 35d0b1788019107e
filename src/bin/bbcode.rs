//! Command-line interface for bbcode
//! Converts a BBCode file (or stdin) into an HTML fragment printed on stdout.
//!
//! Usage:
//!   bbcode `<path>`                        - Convert a file
//!   bbcode < input.txt                    - Convert stdin
//!   bbcode `<path>` --config `<file>`        - Layer a TOML config over the defaults
//!   bbcode `<path>` --flush-trailing       - Keep an unterminated trailing tag as text

use bbcode::bbcode::config::Loader;
use bbcode::bbcode::error::{Error, Result};
use bbcode::convert_with;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("bbcode")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert BBCode markup into an HTML fragment")
        .arg(
            Arg::new("path")
                .help("Path to the BBCode file ('-' or omitted reads stdin)")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("flush-trailing")
                .long("flush-trailing")
                .help("Emit an unterminated tag at the end of input as literal text")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion decisions to stderr (repeat for more detail)")
                .action(ArgAction::Count),
        )
        .get_matches();

    init_tracing(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("flush-trailing") {
        loader = loader.set_override("convert.trailing_tag", "flush")?;
    }
    let config = loader.build()?;
    tracing::debug!(options = ?config.convert, "loaded configuration");

    let source = read_source(matches.get_one::<String>("path").map(String::as_str))?;
    print!("{}", convert_with(&source, &config.convert));
    Ok(())
}

fn read_source(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|err| Error::Io {
                    path: PathBuf::from("<stdin>"),
                    source: err,
                })?;
            Ok(source)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: PathBuf::from(path),
            source,
        }),
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
