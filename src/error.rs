use std::fmt;
use std::io;

/// Errors surfaced to the caller of the core pipeline: a small closed
/// enum, `Display`-able, with `From` impls for the collaborator error
/// types the CSV-backed `Table`/writer glue can produce.
#[derive(Debug)]
pub enum Error {
    InvalidInput(String),
    SchemaMismatch(String),
    NoUsableFeatures(String),
    DuplicateKey(String),
    ConfigEmpty(String),
    Csv(csv::Error),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            Error::NoUsableFeatures(msg) => write!(f, "no usable features: {}", msg),
            Error::DuplicateKey(msg) => write!(f, "duplicate key: {}", msg),
            Error::ConfigEmpty(msg) => write!(f, "empty configuration set: {}", msg),
            Error::Csv(e) => e.fmt(f),
            Error::Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Csv(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::Csv(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
