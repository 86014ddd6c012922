//! Top-level application logic: argument handling, file I/O and
//! diagnostic rendering. Exit-code contract (§6.1): a driver-level
//! failure (bad flag, unreadable file) is an `Err` here and becomes a
//! non-zero exit; an interpreter-level error is rendered to `err_out`
//! and still yields success — the process merely reports it.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error};

use ibc_util::SourceMap;

use crate::cli::{parse_args, CliError, Config, HELP_TEXT};
use crate::pipeline;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error("error opening file \"{path}\"")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn run(
    args: Vec<String>,
    out: &mut dyn Write,
    err_out: &mut dyn Write,
    inp: &mut dyn BufRead,
) -> Result<(), AppError> {
    let config: Config = parse_args(args)?;

    if config.show_help {
        write!(out, "{HELP_TEXT}").ok();
    }
    if config.show_version {
        writeln!(out, "Version {}", env!("CARGO_PKG_VERSION")).ok();
    }

    let Some(path) = config.source_path.as_deref() else {
        return Ok(());
    };
    let raw = read_source(path)?;
    run_file(&raw, out, err_out, inp);
    Ok(())
}

fn read_source(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn run_file(raw: &str, out: &mut dyn Write, err_out: &mut dyn Write, inp: &mut dyn BufRead) {
    let mut source_map = SourceMap::new();
    debug!(bytes = raw.len(), "interpreting source");
    match pipeline::interpret(&mut source_map, raw, out, inp) {
        Ok(elapsed) => {
            writeln!(out, "\nSuccessful execution.\nTime elapsed: {} ms.", elapsed.as_millis()).ok();
        }
        Err(e) => {
            error!(%e, "interpreter error");
            writeln!(err_out, "\n{}", render_diagnostic(&source_map, &e)).ok();
        }
    }
}

fn render_diagnostic(source_map: &SourceMap, err: &ibc_util::Error) -> String {
    match err.pos() {
        Some(pos) => {
            let (line, column, line_text) = source_map.locate(pos.offset);
            let caret = format!("{}^", " ".repeat(column.saturating_sub(1)));
            format!("{err}\nat line {line}, column {column}\n{line_text}{caret}")
        }
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_with(args: Vec<&str>, src_for_stdin: &str) -> (String, String, Result<(), AppError>) {
        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let mut inp = Cursor::new(src_for_stdin.as_bytes().to_vec());
        let result = run(
            args.into_iter().map(String::from).collect(),
            &mut out,
            &mut err_out,
            &mut inp,
        );
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err_out).unwrap(),
            result,
        )
    }

    #[test]
    fn help_flag_prints_usage_and_runs_nothing_else() {
        let (out, _, result) = run_with(vec!["-?"], "");
        assert!(result.is_ok());
        assert!(out.contains("Usage"));
    }

    #[test]
    fn unknown_flag_is_a_driver_error() {
        let (_, _, result) = run_with(vec!["-z"], "");
        assert!(matches!(result, Err(AppError::Cli(CliError::IllegalFlag('z')))));
    }

    #[test]
    fn missing_file_is_a_driver_error() {
        let (_, _, result) = run_with(vec!["-I", "/does/not/exist.pc"], "");
        assert!(matches!(result, Err(AppError::Io { .. })));
    }
}
