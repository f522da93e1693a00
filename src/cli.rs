//! Hand-parsed command-line arguments (component J, CLI half). No
//! argument-parsing crate appears anywhere in the retrieval pack for this
//! kind of tool, so this follows the pack's own convention of walking
//! `std::env::args()` directly.

use std::path::PathBuf;

use lc3core::error::CliError;
use lc3core::hex::parse_u16;

#[derive(Debug, Default)]
pub struct Args {
    pub help: bool,
    pub debug: bool,
    pub randomize: bool,
    pub silent: bool,
    pub input: Option<String>,
    pub dump: Vec<u16>,
    pub memory: Vec<(u16, u16)>,
    pub programs: Vec<PathBuf>,
}

impl Args {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, CliError> {
        let mut parsed = Args::default();
        for arg in args {
            let (flag, value) = match arg.split_once('=') {
                Some((flag, value)) => (flag, Some(value)),
                None => (arg.as_str(), None),
            };

            match flag {
                "--help" | "-h" => parsed.help = true,
                "--debug" => parsed.debug = true,
                "--randomize" => parsed.randomize = true,
                "--silent" => parsed.silent = true,
                "--input" => {
                    let value = value.ok_or_else(|| CliError::MissingValue("--input".to_string()))?;
                    parsed.input = Some(value.to_string());
                }
                "--dump" => {
                    let value = value.ok_or_else(|| CliError::MissingValue("--dump".to_string()))?;
                    parsed.dump = parse_address_list("--dump", value)?;
                }
                "--memory" => {
                    let value = value.ok_or_else(|| CliError::MissingValue("--memory".to_string()))?;
                    let flat = parse_address_list("--memory", value)?;
                    if flat.len() % 2 != 0 {
                        return Err(CliError::BadAddressList {
                            flag: "--memory".to_string(),
                            token: value.to_string(),
                        });
                    }
                    parsed.memory = flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
                }
                _ if flag.starts_with("--") || flag.starts_with('-') => {
                    return Err(CliError::UnknownFlag(flag.to_string()));
                }
                _ => parsed.programs.push(PathBuf::from(arg.clone())),
            }
        }
        Ok(parsed)
    }
}

fn parse_address_list(flag: &str, value: &str) -> Result<Vec<u16>, CliError> {
    value
        .split(',')
        .map(|token| {
            parse_u16(token).ok_or_else(|| CliError::BadAddressList {
                flag: flag.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

pub const HELP_TEXT: &str = "\
lc3sim [flags] <program.obj> [aux.obj ...]

  --help             print this message
  --debug            start the interactive debugger before running
  --randomize        fill user memory with pseudo-random words before loading
  --silent           suppress the startup banner and final output dump
  --input=STR        feed STR to the keyboard device instead of reading stdin
  --dump=A1,A2,...   print memory at the given addresses after halt
  --memory=A,V,...   preload memory cell A with value V before running
";

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Args {
        Args::parse(tokens.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn parses_flags_and_program_path() {
        let a = args(&["--debug", "prog.obj"]);
        assert!(a.debug);
        assert_eq!(a.programs, vec![PathBuf::from("prog.obj")]);
    }

    #[test]
    fn parses_dump_list() {
        let a = args(&["--dump=0x3000,3002,FE00"]);
        assert_eq!(a.dump, vec![0x3000, 0x3002, 0xFE00]);
    }

    #[test]
    fn parses_memory_pairs() {
        let a = args(&["--memory=3000,ABCD,3001,1"]);
        assert_eq!(a.memory, vec![(0x3000, 0xABCD), (0x3001, 0x0001)]);
    }

    #[test]
    fn rejects_odd_length_memory_list() {
        let err = Args::parse(["--memory=3000,ABCD,3001".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::BadAddressList { .. }));
    }

    #[test]
    fn rejects_unknown_flag() {
        let err = Args::parse(["--bogus".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::UnknownFlag(f) if f == "--bogus"));
    }

    #[test]
    fn input_requires_a_value() {
        let err = Args::parse(["--input".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::MissingValue(f) if f == "--input"));
    }
}
