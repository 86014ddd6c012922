use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ibc_par::Stmt;

use crate::containers::{ArrayContainer, CollectionContainer, QueueContainer, StackContainer, StringContainer};
use crate::scope::ScopeKey;

/// Built-in functions installed into the global scope at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinId {
    Output,
    Input,
    ArrayCtor,
    StackCtor,
    QueueCtor,
    CollectionCtor,
    StringCtor,
}

/// A user-defined function: its parameter list, body, the function
/// level it was defined at, and the restricted scope snapshot captured
/// at definition time. The snapshot is held behind `Rc<RefCell<_>>` so
/// a function can see its own binding (needed for recursion) without
/// deep-copying the whole captured environment on every clone of the
/// value — functions are not subject to the container deep-copy rule.
#[derive(Clone)]
pub struct FunctionValue {
    pub params: Rc<Vec<String>>,
    pub body: Rc<Vec<Stmt>>,
    pub defined_block_level: i64,
    pub defined_function_level: i64,
    pub captured: Rc<RefCell<BTreeMap<ScopeKey, Value>>>,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("params", &self.params)
            .field("defined_block_level", &self.defined_block_level)
            .field("defined_function_level", &self.defined_function_level)
            .finish_non_exhaustive()
    }
}

/// The tagged payload of a value, independent of the lvalue/persistent/
/// const metadata layered on top by `Value`.
#[derive(Debug, Clone)]
pub enum Data {
    Empty,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    Str(StringContainer),
    Array(ArrayContainer),
    Stack(StackContainer),
    Queue(QueueContainer),
    Collection(CollectionContainer),
    Function(FunctionValue),
    Builtin(BuiltinId),
}

impl Data {
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Empty => "undefined",
            Data::Bool(_) => "bool",
            Data::Char(_) => "char",
            Data::Int(_) => "int",
            Data::Float(_) => "float",
            Data::Str(_) => "string",
            Data::Array(_) => "array",
            Data::Stack(_) => "stack",
            Data::Queue(_) => "queue",
            Data::Collection(_) => "collection",
            Data::Function(_) => "function",
            Data::Builtin(_) => "function",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Data::Str(_) | Data::Array(_) | Data::Stack(_) | Data::Queue(_) | Data::Collection(_)
        )
    }
}

/// A runtime value: its tagged payload plus the three pieces of
/// metadata the operator engine and scope discipline consult.
#[derive(Debug, Clone)]
pub struct Value {
    pub data: Data,
    /// True when reachable by name from a scope (assignable).
    pub lvalue: bool,
    /// True when assignment must preserve the discriminant.
    pub persistent_type: bool,
    /// True when assignment is rejected outright.
    pub is_const: bool,
}

impl Value {
    fn rvalue(data: Data) -> Self {
        Value {
            data,
            lvalue: false,
            persistent_type: false,
            is_const: false,
        }
    }

    pub fn empty() -> Self {
        Value::rvalue(Data::Empty)
    }

    pub fn bool(b: bool) -> Self {
        Value::rvalue(Data::Bool(b))
    }

    pub fn char(c: char) -> Self {
        Value::rvalue(Data::Char(c))
    }

    pub fn persistent_char(c: char) -> Self {
        let mut v = Value::rvalue(Data::Char(c));
        v.persistent_type = true;
        v
    }

    pub fn int(i: i64) -> Self {
        Value::rvalue(Data::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Value::rvalue(Data::Float(f))
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::rvalue(Data::Str(StringContainer::from_str(s.as_ref())))
    }

    pub fn array(container: ArrayContainer) -> Self {
        Value::rvalue(Data::Array(container))
    }

    pub fn stack(container: StackContainer) -> Self {
        Value::rvalue(Data::Stack(container))
    }

    pub fn queue(container: QueueContainer) -> Self {
        Value::rvalue(Data::Queue(container))
    }

    pub fn collection(container: CollectionContainer) -> Self {
        Value::rvalue(Data::Collection(container))
    }

    pub fn function(f: FunctionValue) -> Self {
        Value::rvalue(Data::Function(f))
    }

    pub fn builtin(id: BuiltinId) -> Self {
        let mut v = Value::rvalue(Data::Builtin(id));
        v.is_const = true;
        v
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn as_lvalue(mut self) -> Self {
        self.lvalue = true;
        self
    }

    pub fn as_rvalue(mut self) -> Self {
        self.lvalue = false;
        self
    }

    /// Deep-copy: containers copy their elements recursively; scalars
    /// and functions copy trivially (functions are reference-counted,
    /// not subject to the container deep-copy rule).
    pub fn deep_copy(&self) -> Value {
        let data = match &self.data {
            Data::Str(s) => Data::Str(StringContainer {
                elements: s.elements.iter().map(|e| e.deep_copy()).collect(),
            }),
            Data::Array(a) => Data::Array(ArrayContainer {
                elements: a.elements.iter().map(|e| e.deep_copy()).collect(),
            }),
            Data::Stack(s) => Data::Stack(StackContainer {
                elements: s.elements.iter().map(|e| e.deep_copy()).collect(),
            }),
            Data::Queue(q) => Data::Queue(QueueContainer {
                elements: q.elements.iter().map(|e| e.deep_copy()).collect(),
            }),
            Data::Collection(c) => Data::Collection(CollectionContainer {
                elements: c.elements.iter().map(|e| e.deep_copy()).collect(),
                cursor: c.cursor,
            }),
            other => other.clone(),
        };
        Value {
            data,
            lvalue: false,
            persistent_type: self.persistent_type,
            is_const: false,
        }
    }

    /// Boolean projection used by `!`, `&&`, `||` and truthiness tests:
    /// numerics/chars are nonzero-is-true, booleans are themselves,
    /// everything else is false.
    pub fn is_true(&self) -> bool {
        match &self.data {
            Data::Bool(b) => *b,
            Data::Int(i) => *i != 0,
            Data::Float(f) => *f != 0.0,
            Data::Char(c) => *c != '\0',
            _ => false,
        }
    }

    /// The textual representation used by `output` and by `+`'s string
    /// coercion: booleans render as `true`/`false`, floats strip
    /// trailing zeros, strings/chars render their content directly.
    pub fn display_string(&self) -> String {
        match &self.data {
            Data::Empty => String::new(),
            Data::Bool(b) => b.to_string(),
            Data::Char(c) => c.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => format_float(*f),
            Data::Str(s) => s.to_rust_string(),
            Data::Array(_) => "<array>".to_string(),
            Data::Stack(_) => "<stack>".to_string(),
            Data::Queue(_) => "<queue>".to_string(),
            Data::Collection(_) => "<collection>".to_string(),
            Data::Function(_) | Data::Builtin(_) => "<function>".to_string(),
        }
    }
}

/// Render a float the way decimal source literals do: fixed-point text
/// with trailing zeros (and a trailing decimal point) stripped.
pub fn format_float(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if f.is_nan() {
        return "nan".to_string();
    }
    let mut s = format!("{f:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_copy_is_independent() {
        let mut a = Value::array(ArrayContainer::with_dims(&[3]));
        a.data = match a.data {
            Data::Array(mut arr) => {
                arr.elements[0] = Value::int(1);
                Data::Array(arr)
            }
            other => other,
        };
        let b = a.deep_copy();
        let Data::Array(mut a_arr) = a.data else { unreachable!() };
        let Data::Array(b_arr) = b.data else { unreachable!() };
        a_arr.elements[0] = Value::int(99);
        assert!(matches!(b_arr.elements[0].data, Data::Int(1)));
    }

    #[test]
    fn float_display_strips_trailing_zeros() {
        assert_eq!(format_float(3.5), "3.5");
        assert_eq!(format_float(3.0), "3");
    }

    #[quickcheck_macros::quickcheck]
    fn array_deep_copy_never_aliases(values: Vec<i64>) -> bool {
        if values.is_empty() {
            return true;
        }
        let mut arr = ArrayContainer::with_dims(&[values.len()]);
        for (slot, v) in arr.elements.iter_mut().zip(&values) {
            *slot = Value::int(*v);
        }
        let original = Value::array(arr);
        let mut copy = original.deep_copy();
        let Data::Array(a) = &mut copy.data else { return false };
        a.elements[0] = Value::int(values[0].wrapping_add(1));
        let Data::Array(orig_arr) = &original.data else { return false };
        matches!(orig_arr.elements[0].data, Data::Int(x) if x == values[0])
    }
}
