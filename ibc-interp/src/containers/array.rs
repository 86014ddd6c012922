use crate::value::Value;

/// A fixed-dimension n-dimensional container. A multi-dimensional array
/// is represented as an array whose elements are themselves arrays of
/// the remaining dimensions, so `size()` is always just the length of
/// this level's element vector.
#[derive(Debug, Clone)]
pub struct ArrayContainer {
    pub elements: Vec<Value>,
}

impl ArrayContainer {
    pub fn with_dims(dims: &[usize]) -> Self {
        debug_assert!(!dims.is_empty());
        let (head, rest) = dims.split_first().unwrap();
        let elements = if rest.is_empty() {
            (0..*head).map(|_| Value::empty()).collect()
        } else {
            (0..*head)
                .map(|_| Value::array(ArrayContainer::with_dims(rest)))
                .collect()
        };
        ArrayContainer { elements }
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }
}
