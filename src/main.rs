#[macro_use]
extern crate serde_derive;

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::process;

use colored::Colorize;

mod util;

static USAGE: &str = "
Finds tuple pairs from two tables that look similar to each other but were
discarded by an upstream entity-resolution blocker, so a user can audit
whether the blocker is too aggressive.

The <candidates> file must be a CSV with two columns holding, respectively,
the left and right table key values of every pair the blocker already kept;
those pairs are never reported again here.

Usage:
    debug-blocker [options] <left-input> <right-input> <candidates>
    debug-blocker --help

debug-blocker options:
    --left-key <col>        Name of the key column in the left table. [default: id]
    --right-key <col>       Name of the key column in the right table. [default: id]
    -k, --size <n>          Number of result pairs to return. [default: 200]
    -j, --jobs <n>          Number of worker threads to use. -1 means all available
                            cpus, other negative values mean cpus + 1 + n. [default: -1]
    -c, --configs <n>       Number of generated configurations to evaluate. -2 means
                            all of them, -1 means the resolved number of jobs. [default: -2]
    -v, --verbose           Print progress information to stderr.

Common options:
    -h, --help              Display this message
    -o, --output <file>     Write output to <file> instead of stdout.
    -d, --delimiter <arg>   The field delimiter for reading CSV data.
                            Must be a single character.
";

#[derive(Deserialize)]
struct Args {
    arg_left_input: String,
    arg_right_input: String,
    arg_candidates: String,
    flag_left_key: String,
    flag_right_key: String,
    flag_size: i64,
    flag_jobs: i32,
    flag_configs: i32,
    flag_verbose: bool,
    flag_output: Option<String>,
    flag_delimiter: Option<String>,
}

fn reader_for(path: &str, delimiter: Option<u8>) -> CliResult<csv::Reader<File>> {
    let mut builder = csv::ReaderBuilder::new();
    if let Some(d) = delimiter {
        builder.delimiter(d);
    }
    Ok(builder.from_path(path)?)
}

fn read_candidates(path: &str, delimiter: Option<u8>) -> CliResult<Vec<(String, String)>> {
    let mut reader = reader_for(path, delimiter)?;
    let mut pairs = Vec::new();

    for record in reader.records() {
        let record = record?;
        let l = record.get(0).unwrap_or("").to_owned();
        let r = record.get(1).unwrap_or("").to_owned();
        pairs.push((l, r));
    }

    Ok(pairs)
}

fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = util::get_args(USAGE, argv)?;

    let delimiter = args
        .flag_delimiter
        .as_deref()
        .map(util::parse_delimiter)
        .transpose()?;

    let l_reader = reader_for(&args.arg_left_input, delimiter)?;
    let r_reader = reader_for(&args.arg_right_input, delimiter)?;

    let l_table = debugblocker::VecTable::from_csv(l_reader, &args.flag_left_key)?;
    let r_table = debugblocker::VecTable::from_csv(r_reader, &args.flag_right_key)?;

    let candidate_pairs = read_candidates(&args.arg_candidates, delimiter)?;

    let output = debugblocker::debug_blocker(
        &l_table,
        &r_table,
        None,
        &candidate_pairs,
        args.flag_size,
        args.flag_jobs,
        args.flag_configs,
        args.flag_verbose,
    )?;

    let mut writer: Box<dyn Write> = match &args.flag_output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    let mut csv_writer = csv::WriterBuilder::new().from_writer(&mut writer);
    csv_writer.write_record(&output.header)?;
    for row in &output.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;

    Ok(())
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let argv: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();

    match run(&argv) {
        Ok(()) => process::exit(0),
        Err(CliError::Flag(err)) => err.exit(),
        Err(CliError::Csv(err)) => {
            eprintln!("debug-blocker: {}", err);
            process::exit(1);
        }
        Err(CliError::Io(ref err)) if err.kind() == io::ErrorKind::BrokenPipe => {
            process::exit(0);
        }
        Err(CliError::Io(err)) => {
            eprintln!("debug-blocker: {}", err);
            process::exit(1);
        }
        Err(CliError::Lib(err)) => {
            eprintln!("{} {}", "debug-blocker:".red(), err);
            process::exit(1);
        }
        Err(CliError::Other(msg)) => {
            eprintln!("debug-blocker: {}", msg);
            process::exit(1);
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Flag(docopt::Error),
    Csv(csv::Error),
    Io(io::Error),
    Lib(debugblocker::Error),
    Other(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::Flag(ref e) => e.fmt(f),
            CliError::Csv(ref e) => e.fmt(f),
            CliError::Io(ref e) => e.fmt(f),
            CliError::Lib(ref e) => e.fmt(f),
            CliError::Other(ref s) => f.write_str(s),
        }
    }
}

impl From<docopt::Error> for CliError {
    fn from(err: docopt::Error) -> CliError {
        CliError::Flag(err)
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> CliError {
        if !err.is_io_error() {
            return CliError::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(v) => From::from(v),
            _ => unreachable!(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> CliError {
        CliError::Io(err)
    }
}

impl From<debugblocker::Error> for CliError {
    fn from(err: debugblocker::Error) -> CliError {
        CliError::Lib(err)
    }
}

impl From<String> for CliError {
    fn from(err: String) -> CliError {
        CliError::Other(err)
    }
}

impl<'a> From<&'a str> for CliError {
    fn from(err: &'a str) -> CliError {
        CliError::Other(err.to_owned())
    }
}
