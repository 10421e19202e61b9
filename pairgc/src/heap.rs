//! Object store.
//!
//! Cells live in a slot arena. Every occupied slot is also threaded on an
//! intrusive singly linked allocation list through [`Object::next`], newest
//! first, which is what sweep walks. Freed slots are tombstoned, their
//! generation is bumped and their index goes on a free list for reuse.
//!
//! Marking uses an explicit worklist, so deep or cyclic pair graphs never
//! recurse on the native stack.

use log::trace;

use crate::{
    GcError, Object, ObjectKind, ObjectRef, Payload, RootProvider, Visitable,
};

// ── Slots ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<Object>,
}

/// The field that refers to the cell sweep is currently looking at: either
/// the list head or the `next` of the last survivor.
#[derive(Debug, Copy, Clone)]
enum Link {
    Head,
    Next(ObjectRef),
}

// ── Heap ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<ObjectRef>,
    count: usize,
    worklist: Vec<ObjectRef>,
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells currently allocated.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Most recently allocated cell, the start of the allocation list.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<ObjectRef> {
        self.head
    }

    /// Number of arena slots, occupied or not.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Resolves a reference. Returns `None` once the cell has been swept.
    #[must_use]
    pub fn get(&self, reference: ObjectRef) -> Option<&Object> {
        self.slots
            .get(reference.index())
            .filter(|slot| slot.generation == reference.generation())
            .and_then(|slot| slot.object.as_ref())
    }

    fn get_mut(&mut self, reference: ObjectRef) -> Option<&mut Object> {
        self.slots
            .get_mut(reference.index())
            .filter(|slot| slot.generation == reference.generation())
            .and_then(|slot| slot.object.as_mut())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, reference: ObjectRef) -> bool {
        self.get(reference).is_some()
    }

    /// Walks the allocation list, newest cell first.
    #[must_use]
    pub fn allocations(&self) -> Allocations<'_> {
        Allocations {
            heap: self,
            cursor: self.head,
        }
    }

    // ── Allocation ────────────────────────────────────────────────────

    /// Creates a cell and prepends it to the allocation list.
    ///
    /// Never collects; the caller decides when to.
    pub fn allocate(&mut self, payload: Payload) -> Result<ObjectRef, GcError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => self.grow()?,
        };

        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.object.is_none(), "free list points at a live slot");
        slot.object = Some(Object::new(payload, self.head));

        let reference = ObjectRef::new(index, slot.generation);
        self.head = Some(reference);
        self.count += 1;
        trace!("allocated {:?} {}", payload.kind(), reference);
        Ok(reference)
    }

    fn grow(&mut self) -> Result<u32, GcError> {
        let index = u32::try_from(self.slots.len())
            .map_err(|_| GcError::OutOfMemory)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| GcError::OutOfMemory)?;
        self.slots.push(Slot::default());
        Ok(index)
    }

    pub(crate) fn set_pair(
        &mut self,
        pair: ObjectRef,
        first: ObjectRef,
        second: ObjectRef,
    ) {
        let Some(object) = self.get_mut(pair) else {
            panic!("dangling pair reference {pair}");
        };
        debug_assert_eq!(object.kind(), ObjectKind::Pair);
        object.payload = Payload::Pair {
            first: Some(first),
            second: Some(second),
        };
    }

    // ── Marking ───────────────────────────────────────────────────────

    /// Marks everything reachable from `root` and returns how many cells
    /// were newly marked.
    ///
    /// Already marked cells are skipped, which is what stops cycles. Pair
    /// edges are traversed depth first, `first` before `second`.
    pub fn mark(&mut self, root: ObjectRef) -> usize {
        let mut worklist = std::mem::take(&mut self.worklist);
        worklist.push(root);

        let mut marked = 0;
        while let Some(current) = worklist.pop() {
            let Some(object) = self.get_mut(current) else {
                panic!("dangling reference {current} reached during marking");
            };
            if object.marked {
                continue;
            }
            object.marked = true;
            marked += 1;

            // reversed so that first is popped before second
            let start = worklist.len();
            object.visit_edges(&mut |edge| worklist.push(edge));
            worklist[start..].reverse();
        }

        self.worklist = worklist;
        marked
    }

    /// Marks from every root the provider yields.
    pub fn mark_from(&mut self, roots: &impl RootProvider) -> usize {
        let mut marked = 0;
        roots.visit_roots(&mut |root| marked += self.mark(root));
        marked
    }

    // ── Sweeping ──────────────────────────────────────────────────────

    /// Frees every unmarked cell and clears the mark of every survivor.
    /// Returns the number of cells freed.
    pub fn sweep(&mut self) -> usize {
        let mut link = Link::Head;
        let mut cursor = self.head;
        let mut freed = 0;

        while let Some(current) = cursor {
            let Some(object) = self.get_mut(current) else {
                panic!("allocation list links freed cell {current}");
            };
            cursor = object.next;

            if object.marked {
                object.marked = false;
                link = Link::Next(current);
                continue;
            }

            self.set_link(link, cursor);
            self.release(current);
            freed += 1;
        }

        freed
    }

    fn set_link(&mut self, link: Link, target: Option<ObjectRef>) {
        match link {
            Link::Head => self.head = target,
            Link::Next(prev) => {
                let Some(prev) = self.get_mut(prev) else {
                    unreachable!("survivor {prev} vanished during sweep");
                };
                prev.next = target;
            }
        }
    }

    fn release(&mut self, reference: ObjectRef) {
        let slot = &mut self.slots[reference.index()];
        slot.object = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(reference.index() as u32);
        self.count -= 1;
        trace!("freed {}", reference);
    }
}

pub struct Allocations<'a> {
    heap: &'a Heap,
    cursor: Option<ObjectRef>,
}

impl<'a> Iterator for Allocations<'a> {
    type Item = (ObjectRef, &'a Object);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        let object = self.heap.get(current)?;
        self.cursor = object.next;
        Some((current, object))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
