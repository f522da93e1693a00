//! Component K: error types at the host boundary (object-file loading, CLI
//! parsing). The core library propagates [`crate::exception::Exception`]
//! through `Result`; these two enums are for the binary's own I/O and
//! argument-parsing failures, using plain `std::error::Error` impls rather
//! than pulling in an error-derive crate.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoaderError {
    /// The main program file could not be opened or read (fatal).
    ProgramFile { path: PathBuf, source: std::io::Error },
    /// An object file's word count is odd (origin plus an incomplete word).
    TruncatedFile { path: PathBuf },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::ProgramFile { path, source } => {
                write!(f, "failed to read object file {}: {source}", path.display())
            }
            LoaderError::TruncatedFile { path } => {
                write!(f, "object file {} has a dangling half-word", path.display())
            }
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoaderError::ProgramFile { source, .. } => Some(source),
            LoaderError::TruncatedFile { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    UnknownFlag(String),
    MissingValue(String),
    BadAddressList { flag: String, token: String },
    NoProgramFile,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownFlag(flag) => write!(f, "unknown flag: {flag}"),
            CliError::MissingValue(flag) => write!(f, "{flag} requires a value"),
            CliError::BadAddressList { flag, token } => {
                write!(f, "{flag}: could not parse '{token}' as a hex address or value")
            }
            CliError::NoProgramFile => write!(f, "no object file given"),
        }
    }
}

impl std::error::Error for CliError {}
