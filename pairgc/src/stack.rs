use crate::{ObjectRef, RootProvider};

pub const DEFAULT_STACK_CAPACITY: usize = 256;

/// The operand stack. Its contents are the whole root set of the machine.
///
/// The capacity is fixed at construction; running past it, or popping an
/// empty stack, is a caller bug and panics.
#[derive(Debug, Clone)]
pub struct RootStack {
    roots: Vec<ObjectRef>,
    capacity: usize,
}

impl Default for RootStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_CAPACITY)
    }
}

impl RootStack {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            roots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the active portion of the stack, bottom first
    #[must_use]
    pub fn as_slice(&self) -> &[ObjectRef] {
        &self.roots
    }

    /// Pushes a root onto the stack
    pub fn push(&mut self, root: ObjectRef) {
        assert!(self.roots.len() < self.capacity, "Root stack overflow");
        self.roots.push(root);
    }

    /// Pops the most recently pushed root
    pub fn pop(&mut self) -> ObjectRef {
        let Some(root) = self.roots.pop() else {
            panic!("Root stack underflow");
        };
        root
    }

    /// Gets the nth root from the top of the stack (0-indexed)
    #[must_use]
    pub fn get_nth(&self, n: usize) -> Option<ObjectRef> {
        let depth = self.roots.len();
        if n >= depth {
            return None;
        }
        self.roots.get(depth - 1 - n).copied()
    }

    #[must_use]
    pub fn peek(&self) -> Option<ObjectRef> {
        self.roots.last().copied()
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.roots.len() >= self.capacity
    }
}

impl RootProvider for RootStack {
    fn visit_roots(&self, visitor: &mut dyn FnMut(ObjectRef)) {
        self.roots.iter().for_each(|&root| visitor(root));
    }
}
