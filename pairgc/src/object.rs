use std::fmt;

/// Non-owning reference to a heap cell.
///
/// The index selects a slot in the heap arena, the generation tells apart
/// successive occupants of the same slot. A reference whose cell was swept
/// never resolves again, even after its slot has been reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    #[inline]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Scalar = 0,
    Pair = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Payload {
    Scalar {
        value: i64,
    },
    Pair {
        first: Option<ObjectRef>,
        second: Option<ObjectRef>,
    },
}

impl Payload {
    /// Zero value of a kind: scalar 0 or a pair with both fields empty.
    #[must_use]
    pub fn zeroed(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Scalar => Payload::Scalar { value: 0 },
            ObjectKind::Pair => Payload::Pair {
                first: None,
                second: None,
            },
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Payload::Scalar { .. } => ObjectKind::Scalar,
            Payload::Pair { .. } => ObjectKind::Pair,
        }
    }
}

/// A heap cell.
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) payload: Payload,
    pub(crate) marked: bool,
    // allocation list link, only the heap follows it
    pub(crate) next: Option<ObjectRef>,
}

impl Object {
    pub(crate) fn new(payload: Payload, next: Option<ObjectRef>) -> Self {
        Self {
            payload,
            marked: false,
            next,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Next cell in the allocation list.
    #[inline]
    #[must_use]
    pub fn next(&self) -> Option<ObjectRef> {
        self.next
    }

    /// The value of a scalar, `None` for pairs.
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        match self.payload {
            Payload::Scalar { value } => Some(value),
            Payload::Pair { .. } => None,
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<ObjectRef> {
        match self.payload {
            Payload::Pair { first, .. } => first,
            Payload::Scalar { .. } => None,
        }
    }

    #[must_use]
    pub fn second(&self) -> Option<ObjectRef> {
        match self.payload {
            Payload::Pair { second, .. } => second,
            Payload::Scalar { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_payloads_are_empty() {
        assert_eq!(
            Payload::zeroed(ObjectKind::Scalar),
            Payload::Scalar { value: 0 }
        );
        assert_eq!(
            Payload::zeroed(ObjectKind::Pair),
            Payload::Pair {
                first: None,
                second: None
            }
        );
    }

    #[test]
    fn new_object_is_unmarked_and_keeps_its_kind() {
        let link = ObjectRef::new(3, 0);
        let obj = Object::new(Payload::zeroed(ObjectKind::Pair), Some(link));

        assert_eq!(obj.kind(), ObjectKind::Pair);
        assert!(!obj.is_marked());
        assert_eq!(obj.next(), Some(link));
        assert_eq!(obj.value(), None);
        assert_eq!(obj.first(), None);
        assert_eq!(obj.second(), None);
    }

    #[test]
    fn pair_accessors_return_fields() {
        let a = ObjectRef::new(0, 0);
        let b = ObjectRef::new(1, 0);
        let obj = Object::new(
            Payload::Pair {
                first: Some(a),
                second: Some(b),
            },
            None,
        );

        assert_eq!(obj.first(), Some(a));
        assert_eq!(obj.second(), Some(b));
    }

    #[test]
    fn refs_with_different_generations_differ() {
        let old = ObjectRef::new(5, 0);
        let new = ObjectRef::new(5, 1);
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
        assert_eq!(format!("{}", new), "#5");
    }
}
