use log::{debug, warn};

use crate::{
    DEFAULT_STACK_CAPACITY, GcError, Heap, Object, ObjectKind, ObjectRef,
    Payload, RootStack,
};

pub const DEFAULT_INITIAL_THRESHOLD: usize = 8;
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

/// Configuration of a [`Machine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSettings {
    /// Number of roots the operand stack can hold.
    pub stack_capacity: usize,
    /// Allocation count that triggers the first collection.
    pub initial_threshold: usize,
    /// After a collection the threshold becomes the surviving count times
    /// this factor.
    pub growth_factor: usize,
    /// Lower bound for the threshold after a collection. With the default
    /// of 1 it only takes effect when nothing survives; any surviving count
    /// `k >= 1` already yields `k * growth_factor >= 1`.
    pub min_threshold: usize,
    /// Hard cap on live objects. `None` leaves only the memory provider as
    /// a limit.
    pub max_objects: Option<usize>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            min_threshold: 1,
            max_objects: None,
        }
    }
}

impl MachineSettings {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.stack_capacity == 0 {
            return Err("stack_capacity must be > 0");
        }
        if self.initial_threshold == 0 {
            return Err("initial_threshold must be > 0");
        }
        if self.growth_factor == 0 {
            return Err("growth_factor must be > 0");
        }
        if self.min_threshold == 0 {
            return Err("min_threshold must be > 0");
        }
        if self.max_objects == Some(0) {
            return Err("max_objects must be > 0");
        }
        Ok(())
    }
}

/// Outcome of a single collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub marked: usize,
    pub collected: usize,
    pub remaining: usize,
    /// Threshold in effect after the collection.
    pub threshold: usize,
}

/// Running totals over the lifetime of a machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GarbageCollectionStats {
    pub collections: usize,
    pub allocated: usize,
    pub collected: usize,
}

/// A stack machine owning a mark-and-sweep heap of scalars and pairs.
///
/// The operand stack is the only root set. Collections run synchronously,
/// either when an allocation finds the heap at its threshold or on an
/// explicit [`Machine::collect`].
#[derive(Debug)]
pub struct Machine {
    heap: Heap,
    roots: RootStack,
    threshold: usize,
    settings: MachineSettings,
    stats: GarbageCollectionStats,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Empty machine with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::build(MachineSettings::default())
    }

    pub fn with_settings(settings: MachineSettings) -> Result<Self, GcError> {
        settings.validate().map_err(GcError::InvalidSettings)?;
        Ok(Self::build(settings))
    }

    fn build(settings: MachineSettings) -> Self {
        Self {
            heap: Heap::new(),
            roots: RootStack::new(settings.stack_capacity),
            threshold: settings.initial_threshold,
            settings,
            stats: GarbageCollectionStats::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.heap.count()
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.roots.depth()
    }

    #[must_use]
    pub fn roots(&self) -> &RootStack {
        &self.roots
    }

    #[must_use]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    // pair fields are otherwise only written by make_pair
    pub(crate) fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    #[must_use]
    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    #[must_use]
    pub fn stats(&self) -> GarbageCollectionStats {
        self.stats
    }

    /// Resolves a reference, `None` if it has been collected.
    #[must_use]
    pub fn object(&self, reference: ObjectRef) -> Option<&Object> {
        self.heap.get(reference)
    }

    // ── Root stack ────────────────────────────────────────────────────

    pub fn push_root(&mut self, object: ObjectRef) {
        assert!(
            self.heap.contains(object),
            "pushing collected object {object}"
        );
        self.roots.push(object);
    }

    pub fn pop_root(&mut self) -> ObjectRef {
        self.roots.pop()
    }

    /// Allocates a scalar holding `value` and pushes it.
    pub fn push_scalar(&mut self, value: i64) -> Result<ObjectRef, GcError> {
        assert!(!self.roots.is_full(), "Root stack overflow");
        let object = self.allocate(Payload::Scalar { value })?;
        self.roots.push(object);
        Ok(object)
    }

    /// Replaces the top two roots with a pair of them.
    ///
    /// The root popped last (pushed first) goes to `second`, the top of the
    /// stack goes to `first`. Both operands stay rooted while the pair is
    /// allocated, so a collection triggered here cannot free them.
    pub fn make_pair(&mut self) -> Result<ObjectRef, GcError> {
        assert!(self.roots.depth() >= 2, "Root stack underflow");
        let pair = self.allocate(Payload::zeroed(ObjectKind::Pair))?;

        let first = self.roots.pop();
        let second = self.roots.pop();
        self.heap.set_pair(pair, first, second);
        self.roots.push(pair);
        Ok(pair)
    }

    // ── Collection ────────────────────────────────────────────────────

    fn allocate(&mut self, payload: Payload) -> Result<ObjectRef, GcError> {
        let mut collected = false;
        if self.heap.count() >= self.threshold {
            self.collect();
            collected = true;
        }

        if let Some(limit) = self.settings.max_objects {
            if self.heap.count() >= limit && !collected {
                self.collect();
            }
            let live = self.heap.count();
            if live >= limit {
                warn!("object limit reached: {live} live, limit {limit}");
                return Err(GcError::HeapExhausted { live, limit });
            }
        }

        let object = self.heap.allocate(payload)?;
        self.stats.allocated += 1;
        Ok(object)
    }

    /// Runs a full mark-and-sweep cycle and recomputes the threshold.
    pub fn collect(&mut self) -> CollectionStats {
        let marked = self.heap.mark_from(&self.roots);
        let collected = self.heap.sweep();
        let remaining = self.heap.count();

        self.threshold = remaining
            .saturating_mul(self.settings.growth_factor)
            .max(self.settings.min_threshold);

        self.stats.collections += 1;
        self.stats.collected += collected;
        debug!("Collected {collected} objects, {remaining} remaining.");

        CollectionStats {
            marked,
            collected,
            remaining,
            threshold: self.threshold,
        }
    }
}

impl Drop for Machine {
    fn drop(&mut self) {
        debug!("releasing machine with {} objects", self.heap.count());
    }
}
