//! Command-line argument handling. Mirrors the original program's
//! combined short-flag grammar (`-VI path` is `-V` followed by `-I
//! path`) rather than reaching for a derive-based parser — the bundled
//! flag where one of the letters consumes the next argument doesn't map
//! cleanly onto that style of API.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("illegal command line argument: {0}")]
    IllegalFlag(char),
    #[error("input file already set")]
    InputFileAlreadySet,
    #[error("input file path expected")]
    MissingInputPath,
    #[error("illegal command line arguments")]
    UnexpectedArguments,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub source_path: Option<PathBuf>,
    pub show_help: bool,
    pub show_version: bool,
}

pub const HELP_TEXT: &str = "IB pseudocode interpreter.\n\
Usage\t-? : Prints this message\n\
\t-I <path> : Sets input code file\n\
\t-V : Prints version number\n";

/// Parses a flag-cluster command line: every argument is either `-`
/// followed by one or more flag letters, or (immediately after a
/// cluster containing `i`/`I`) a bare path. Anything else is rejected.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Config, CliError> {
    let args: Vec<String> = args.into_iter().collect();
    let mut config = Config::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        let flags = arg.strip_prefix('-').ok_or(CliError::UnexpectedArguments)?;
        if flags.is_empty() {
            return Err(CliError::UnexpectedArguments);
        }
        let mut wants_path = false;
        for c in flags.chars() {
            match c.to_ascii_lowercase() {
                '?' => config.show_help = true,
                'v' => config.show_version = true,
                'i' => wants_path = true,
                other => return Err(CliError::IllegalFlag(other)),
            }
        }
        if wants_path {
            if config.source_path.is_some() {
                return Err(CliError::InputFileAlreadySet);
            }
            i += 1;
            let path = args.get(i).ok_or(CliError::MissingInputPath)?;
            config.source_path = Some(PathBuf::from(path));
        }
        i += 1;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_flags_set_help_and_version() {
        let config = parse_args(["-VI".to_string(), "prog.pc".to_string()]).unwrap();
        assert!(config.show_version);
        assert_eq!(config.source_path, Some(PathBuf::from("prog.pc")));
    }

    #[test]
    fn bare_help_flag() {
        let config = parse_args(["-?".to_string()]).unwrap();
        assert!(config.show_help);
        assert_eq!(config.source_path, None);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert_eq!(parse_args(["-z".to_string()]), Err(CliError::IllegalFlag('z')));
    }

    #[test]
    fn missing_path_after_i_is_rejected() {
        assert_eq!(parse_args(["-I".to_string()]), Err(CliError::MissingInputPath));
    }

    #[test]
    fn setting_input_file_twice_is_rejected() {
        let args = ["-I".to_string(), "a.pc".to_string(), "-I".to_string(), "b.pc".to_string()];
        assert_eq!(parse_args(args), Err(CliError::InputFileAlreadySet));
    }

    #[test]
    fn bare_word_without_dash_is_rejected() {
        assert_eq!(parse_args(["prog.pc".to_string()]), Err(CliError::UnexpectedArguments));
    }
}
