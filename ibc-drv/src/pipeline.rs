//! Wires source cleaning, lexing, parsing and evaluation together and
//! times the evaluation phase the way the original driver did (the
//! clock starts after parsing, not before).

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use ibc_interp::Evaluator;
use ibc_util::{Result, SourceMap};

pub fn interpret(
    source_map: &mut SourceMap,
    raw_source: &str,
    out: &mut dyn Write,
    inp: &mut dyn BufRead,
) -> Result<Duration> {
    let cleaned = source_map.clean(raw_source);
    trace!(bytes = cleaned.len(), "cleaned source");

    let tokens = ibc_lex::tokenize(&cleaned)?;
    debug!(tokens = tokens.len(), "lexed");

    let program = ibc_par::parse(tokens)?;
    debug!(statements = program.len(), "parsed");

    let start = Instant::now();
    let mut evaluator = Evaluator::new(out, inp);
    evaluator.run(&program)?;
    Ok(start.elapsed())
}
