// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::{self, Read, Write};
use std::process;

use pico_args::Arguments;

const HELP: &str = "\
safesvg is an allowlist-based SVG sanitiser.

USAGE:
  safesvg [OPTIONS] <in-svg> <out-svg>  # from file to file
  safesvg [OPTIONS] <in-svg> -c         # from file to stdout
  safesvg [OPTIONS] - <out-svg>         # from stdin to file
  safesvg [OPTIONS] - -c                # from stdin to stdout

OPTIONS:
  -h, --help                    Prints help information
  -V, --version                 Prints version information
  -c                            Prints the output SVG to the stdout

  --cautious                    Removes comments and styles.
                                Same as '--remove-comments --no-style'
  --no-namespace                Do not add the SVG namespace to the root element
  --compact                     Writes the output SVG without indentation
  --remove-comments             Removes XML comments
  --no-style                    Removes 'style' elements and attributes

  --quiet                       Disables warnings
  --verbose                     Prints every removed element and attribute

ARGS:
  <in-svg>                      Input file
  <out-svg>                     Output file
";

#[derive(Debug)]
struct Args {
    cautious: bool,
    no_namespace: bool,
    compact: bool,
    remove_comments: bool,
    no_style: bool,

    quiet: bool,
    verbose: bool,

    input: String,
    output: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    Ok(Args {
        cautious:           input.contains("--cautious"),
        no_namespace:       input.contains("--no-namespace"),
        compact:            input.contains("--compact"),
        remove_comments:    input.contains("--remove-comments"),
        no_style:           input.contains("--no-style"),

        quiet:              input.contains("--quiet"),
        verbose:            input.contains("--verbose"),

        input:              input.free_from_str()?,
        output:             input.free_from_str()?,
    })
}

impl Args {
    fn options(&self) -> safesvg::Options {
        let mut opt = if self.cautious {
            safesvg::Options::cautious()
        } else {
            safesvg::Options::default()
        };

        if self.no_namespace {
            opt.add_namespace = false;
        }

        if self.compact {
            opt.indent_output = false;
        }

        if self.remove_comments {
            opt.remove_comments = true;
        }

        if self.no_style {
            opt.allow_style = false;
        }

        opt
    }
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            if args.verbose {
                log::set_max_level(log::LevelFilter::Debug);
            } else {
                log::set_max_level(log::LevelFilter::Warn);
            }
        }
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let svg_from = match args.input.as_str() {
        "-" => InputFrom::Stdin,
        "-c" => return Err("-c should be set after input".to_string()),
        path => InputFrom::File(path),
    };

    let svg_to = match args.output.as_str() {
        "-c" => OutputTo::Stdout,
        path => OutputTo::File(path),
    };

    let input_svg = match svg_from {
        InputFrom::Stdin => load_stdin(),
        InputFrom::File(path) => std::fs::read(path).map_err(|e| e.to_string()),
    }?;

    let opt = args.options();
    let s = safesvg::try_sanitise_data(&input_svg, &opt).map_err(|e| e.to_string())?;

    match svg_to {
        OutputTo::Stdout => {
            io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| "failed to write to the stdout".to_string())?;
        }
        OutputTo::File(path) => {
            std::fs::write(path, s.as_bytes())
                .map_err(|_| "failed to write to the output file".to_string())?;
        }
    }

    Ok(())
}

fn load_stdin() -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
