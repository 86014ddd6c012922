use crate::value::Value;

/// A 1-D ordered sequence of character elements. Stored as persistent-typed
/// char values so indexing can hand back a real lvalue slot rather than a
/// synthesized copy.
#[derive(Debug, Clone, Default)]
pub struct StringContainer {
    pub elements: Vec<Value>,
}

impl StringContainer {
    pub fn from_str(s: &str) -> Self {
        StringContainer {
            elements: s.chars().map(Value::persistent_char).collect(),
        }
    }

    pub fn length(&self) -> usize {
        self.elements.len()
    }

    pub fn to_rust_string(&self) -> String {
        self.elements
            .iter()
            .map(|v| match &v.data {
                crate::value::Data::Char(c) => *c,
                _ => '\u{fffd}',
            })
            .collect()
    }
}
