//! The tree-walking evaluator: value model, scope discipline, operator
//! engine and built-ins for the language `ibc-lex`/`ibc-par` front-end.

mod builtins;
mod containers;
mod evaluator;
mod operators;
mod place;
mod scope;
mod value;

pub use builtins::install_globals;
pub use evaluator::Evaluator;
pub use scope::{Scope, ScopeKey};
pub use value::{BuiltinId, Data, FunctionValue, Value};
