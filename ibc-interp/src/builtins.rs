//! Global built-ins (`output`, `input`, container constructors) and the
//! per-kind method dispatch table. The source's per-instance method
//! scope is replaced here by a direct `(container, method_name) -> fn`
//! table, as the design calls for.

use std::io::BufRead;

use ibc_util::{Error, Position, Result};

use crate::containers::{ArrayContainer, CollectionContainer, QueueContainer, StackContainer};
use crate::scope::Scope;
use crate::value::{BuiltinId, Data, Value};

pub fn install_globals(scope: &mut Scope) {
    scope.declare("output", Value::builtin(BuiltinId::Output));
    scope.declare("input", Value::builtin(BuiltinId::Input));
    scope.declare("Array", Value::builtin(BuiltinId::ArrayCtor));
    scope.declare("Stack", Value::builtin(BuiltinId::StackCtor));
    scope.declare("Queue", Value::builtin(BuiltinId::QueueCtor));
    scope.declare("Collection", Value::builtin(BuiltinId::CollectionCtor));
    scope.declare("String", Value::builtin(BuiltinId::StringCtor));
}

fn require_positive_int(v: &Value, offset: usize) -> Result<usize> {
    match v.data {
        Data::Int(i) if i > 0 => Ok(i as usize),
        Data::Int(_) => Err(Error::value("array dimension must be positive").set_pos_if_unset(Position::new(offset))),
        _ => Err(Error::ty("array dimension must be an integer").set_pos_if_unset(Position::new(offset))),
    }
}

/// Dispatch a call to one of the non-constructor, non-I/O built-ins
/// (`Array`/`Stack`/`Queue`/`Collection`/`String` constructors).
pub fn call_ctor(id: BuiltinId, args: &[Value], offset: usize) -> Result<Value> {
    match id {
        BuiltinId::ArrayCtor => {
            if args.is_empty() {
                return Err(Error::argument("Array() requires at least one dimension")
                    .set_pos_if_unset(Position::new(offset)));
            }
            let dims: Vec<usize> = args
                .iter()
                .map(|a| require_positive_int(a, offset))
                .collect::<Result<_>>()?;
            Ok(Value::array(ArrayContainer::with_dims(&dims)))
        }
        BuiltinId::StackCtor => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::stack(StackContainer::default()))
        }
        BuiltinId::QueueCtor => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::queue(QueueContainer::default()))
        }
        BuiltinId::CollectionCtor => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::collection(CollectionContainer::new()))
        }
        BuiltinId::StringCtor => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::string(""))
        }
        BuiltinId::Output | BuiltinId::Input => {
            unreachable!("output/input are dispatched separately, they need I/O and place access")
        }
    }
}

fn expect_arity(got: usize, want: usize, offset: usize) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(Error::argument(format!("expected {want} argument(s), found {got}"))
            .set_pos_if_unset(Position::new(offset)))
    }
}

pub fn output(args: &[Value], out: &mut dyn std::io::Write) -> Result<Value> {
    let rendered: Vec<String> = args.iter().map(Value::display_string).collect();
    writeln!(out, "{}", rendered.join(" ")).map_err(|e| Error::fatal(e.to_string()))?;
    Ok(Value::empty())
}

/// Reads one line of text. Parsed as an integer if possible, else a
/// float, else left as a string. EOF yields an empty string value.
pub fn read_input(inp: &mut dyn BufRead) -> Result<Value> {
    let mut line = String::new();
    let n = inp.read_line(&mut line).map_err(|e| Error::fatal(e.to_string()))?;
    if n == 0 {
        return Ok(Value::string(""));
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::int(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Ok(Value::float(f));
    }
    Ok(Value::string(trimmed))
}

/// `(container, method_name) -> fn(container, args)`.
pub fn dispatch_method(receiver: &mut Value, method: &str, args: Vec<Value>, offset: usize) -> Result<Value> {
    match (&mut receiver.data, method) {
        (Data::Array(a), "size") => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::int(a.size() as i64))
        }
        (Data::Str(s), "length") => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::int(s.length() as i64))
        }
        (Data::Stack(s), "push") => {
            expect_arity(args.len(), 1, offset)?;
            s.push(args.into_iter().next().unwrap().deep_copy());
            Ok(Value::empty())
        }
        (Data::Stack(s), "pop") => {
            expect_arity(args.len(), 0, offset)?;
            s.pop()
                .map(|v| v.as_rvalue())
                .ok_or_else(|| Error::value("pop from an empty stack").set_pos_if_unset(Position::new(offset)))
        }
        (Data::Stack(s), "isEmpty") => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::bool(s.is_empty()))
        }
        (Data::Queue(q), "enqueue") => {
            expect_arity(args.len(), 1, offset)?;
            q.enqueue(args.into_iter().next().unwrap().deep_copy());
            Ok(Value::empty())
        }
        (Data::Queue(q), "dequeue") => {
            expect_arity(args.len(), 0, offset)?;
            q.dequeue()
                .map(|v| v.as_rvalue())
                .ok_or_else(|| Error::value("dequeue from an empty queue").set_pos_if_unset(Position::new(offset)))
        }
        (Data::Queue(q), "isEmpty") => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::bool(q.is_empty()))
        }
        (Data::Collection(c), "addItem") => {
            expect_arity(args.len(), 1, offset)?;
            c.add_item(args.into_iter().next().unwrap().deep_copy());
            Ok(Value::empty())
        }
        (Data::Collection(c), "resetNext") => {
            expect_arity(args.len(), 0, offset)?;
            c.reset_next();
            Ok(Value::empty())
        }
        (Data::Collection(c), "hasNext") => {
            expect_arity(args.len(), 0, offset)?;
            Ok(Value::bool(c.has_next()))
        }
        (Data::Collection(c), "getNext") => {
            expect_arity(args.len(), 0, offset)?;
            c.get_next()
                .map(|v| v.as_rvalue())
                .ok_or_else(|| Error::range("no next element in collection").set_pos_if_unset(Position::new(offset)))
        }
        (data, method) => Err(Error::argument(format!(
            "'{}' has no method '{method}'",
            data.type_name()
        ))
        .set_pos_if_unset(Position::new(offset))),
    }
}
