use crate::value::Value;

/// Ordered sequence with an internal cursor starting before the first
/// element (`-1`). `get_next` advances the cursor and returns the
/// element there, failing once the cursor runs past the end.
#[derive(Debug, Clone, Default)]
pub struct CollectionContainer {
    pub elements: Vec<Value>,
    pub cursor: i64,
}

impl CollectionContainer {
    pub fn new() -> Self {
        CollectionContainer {
            elements: Vec::new(),
            cursor: -1,
        }
    }

    pub fn add_item(&mut self, v: Value) {
        self.elements.push(v);
    }

    pub fn reset_next(&mut self) {
        self.cursor = -1;
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.elements.len() as i64
    }

    pub fn get_next(&mut self) -> Option<Value> {
        if !self.has_next() {
            return None;
        }
        self.cursor += 1;
        self.elements.get(self.cursor as usize).cloned()
    }
}
