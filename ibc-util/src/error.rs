use std::fmt;

/// A byte offset into the cleaned source text.
///
/// Positions are attached to errors at most once: the innermost node to
/// observe a failure stamps its offset, and every enclosing node that
/// rethrows the same error leaves it alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
}

impl Position {
    pub fn new(offset: usize) -> Self {
        Position { offset }
    }
}

/// The eight positioned error kinds plus a base `Custom`, matching the
/// taxonomy every evaluator stage raises into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Custom(String),
    #[error("{0}")]
    Lexing(String),
    #[error("{0}")]
    Parsing(String),
    #[error("{0}")]
    Name(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Value(String),
    #[error("{0}")]
    Range(String),
    #[error("{0}")]
    Argument(String),
    #[error("{0}")]
    Fatal(String),
}

impl ErrorKind {
    fn label(&self) -> &'static str {
        match self {
            ErrorKind::Custom(_) => "Error",
            ErrorKind::Lexing(_) => "LexingError",
            ErrorKind::Parsing(_) => "ParsingError",
            ErrorKind::Name(_) => "NameError",
            ErrorKind::Type(_) => "TypeError",
            ErrorKind::Value(_) => "ValueError",
            ErrorKind::Range(_) => "RangeError",
            ErrorKind::Argument(_) => "ArgumentError",
            ErrorKind::Fatal(_) => "FatalError",
        }
    }

    fn message(&self) -> &str {
        match self {
            ErrorKind::Custom(m)
            | ErrorKind::Lexing(m)
            | ErrorKind::Parsing(m)
            | ErrorKind::Name(m)
            | ErrorKind::Type(m)
            | ErrorKind::Value(m)
            | ErrorKind::Range(m)
            | ErrorKind::Argument(m)
            | ErrorKind::Fatal(m) => m,
        }
    }
}

/// A diagnostic carrying its kind, message and an at-most-once position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    pos: Option<Position>,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Error { kind, pos: None }
    }

    pub fn custom(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Custom(msg.into()))
    }
    pub fn lexing(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Lexing(msg.into()))
    }
    pub fn parsing(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Parsing(msg.into()))
    }
    pub fn name(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Name(msg.into()))
    }
    pub fn ty(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Type(msg.into()))
    }
    pub fn value(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Value(msg.into()))
    }
    pub fn range(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Range(msg.into()))
    }
    pub fn argument(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Argument(msg.into()))
    }
    pub fn fatal(msg: impl Into<String>) -> Self {
        Error::new(ErrorKind::Fatal(msg.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        self.kind.message()
    }

    pub fn pos(&self) -> Option<Position> {
        self.pos
    }

    pub fn is_pos_set(&self) -> bool {
        self.pos.is_some()
    }

    /// Stamp a position onto this error unless one was already set.
    /// The single chokepoint every call/subscript node uses when
    /// rethrowing, so the innermost offset always wins.
    pub fn set_pos_if_unset(mut self, pos: Position) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }

    pub fn with_pos(kind: ErrorKind, pos: Position) -> Self {
        Error {
            kind,
            pos: Some(pos),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.kind.message())
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_set_once() {
        let e = Error::range("index out of bounds").set_pos_if_unset(Position::new(5));
        let e = e.set_pos_if_unset(Position::new(99));
        assert_eq!(e.pos(), Some(Position::new(5)));
    }

    #[test]
    fn display_includes_label() {
        let e = Error::name("undefined identifier 'x'");
        assert_eq!(e.to_string(), "NameError: undefined identifier 'x'");
    }

    #[quickcheck_macros::quickcheck]
    fn position_never_overwritten_once_set(first: usize, second: usize) -> bool {
        let e = Error::value("x")
            .set_pos_if_unset(Position::new(first))
            .set_pos_if_unset(Position::new(second));
        e.pos() == Some(Position::new(first))
    }
}
