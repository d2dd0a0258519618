//! Bounded snapshot undo/redo.

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Two bounded stacks of structural snapshots.
///
/// Callers push the *pre-mutation* state with [`History::checkpoint`] and
/// hand in the current state on undo/redo so it can be moved to the
/// opposite stack.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> History<T> {
    /// Create a history keeping at most `capacity` undo states.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push the state from before a mutation (call before making changes).
    pub fn checkpoint(&mut self, snapshot: T) {
        self.undo_stack.push(snapshot);

        // Clear redo stack when new changes are made
        self.redo_stack.clear();

        // Limit undo history size
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change.
    ///
    /// Returns the state to restore, or `None` (and drops nothing) if there
    /// is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Redo the last undone change.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
        Some(snapshot)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
