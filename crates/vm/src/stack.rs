//! LIFO word stack used for both operands and return addresses.

/// A bounded stack of 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    items: Vec<u64>,
    max_depth: usize,
}

impl Stack {
    /// Create an empty stack holding at most `max_depth` words.
    pub fn new(max_depth: usize) -> Self {
        Self {
            items: Vec::new(),
            max_depth,
        }
    }

    /// Push a word. Returns `None` if the stack is full.
    pub fn push(&mut self, value: u64) -> Option<()> {
        if self.items.len() >= self.max_depth {
            return None;
        }
        self.items.push(value);
        Some(())
    }

    pub fn pop(&mut self) -> Option<u64> {
        self.items.pop()
    }

    /// The word `offset` slots below the top (0 = top).
    pub fn peek(&self, offset: u64) -> Option<u64> {
        let offset = usize::try_from(offset).ok()?;
        let idx = self.items.len().checked_sub(offset)?.checked_sub(1)?;
        self.items.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bottom-to-top view of the stack.
    pub fn as_slice(&self) -> &[u64] {
        &self.items
    }
}
