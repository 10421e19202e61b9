use crate::{Object, ObjectRef, Payload};

/// Enumerates the outgoing references of a heap cell.
pub trait Visitable {
    fn visit_edges(&self, visitor: &mut dyn FnMut(ObjectRef));
}

/// Supplies the roots of a collection.
///
/// Every reference handed to the visitor is treated as live for the whole
/// mark phase.
pub trait RootProvider {
    fn visit_roots(&self, visitor: &mut dyn FnMut(ObjectRef));
}

// first, then second
impl Visitable for Object {
    #[inline]
    fn visit_edges(&self, visitor: &mut dyn FnMut(ObjectRef)) {
        match self.payload {
            Payload::Scalar { .. } => (),
            Payload::Pair { first, second } => {
                if let Some(first) = first {
                    visitor(first);
                }
                if let Some(second) = second {
                    visitor(second);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectKind;

    fn collect_edges(obj: &Object) -> Vec<ObjectRef> {
        let mut edges = Vec::new();
        obj.visit_edges(&mut |edge| edges.push(edge));
        edges
    }

    #[test]
    fn scalars_have_no_edges() {
        let obj = Object::new(Payload::Scalar { value: 7 }, None);
        assert!(collect_edges(&obj).is_empty());
    }

    #[test]
    fn pair_visits_first_before_second() {
        let a = ObjectRef::new(1, 0);
        let b = ObjectRef::new(2, 0);
        let obj = Object::new(
            Payload::Pair {
                first: Some(a),
                second: Some(b),
            },
            None,
        );
        assert_eq!(collect_edges(&obj), vec![a, b]);
    }

    #[test]
    fn empty_pair_fields_are_skipped() {
        let b = ObjectRef::new(2, 0);
        let obj = Object::new(
            Payload::Pair {
                first: None,
                second: Some(b),
            },
            None,
        );
        assert_eq!(collect_edges(&obj), vec![b]);

        let empty = Object::new(Payload::zeroed(ObjectKind::Pair), None);
        assert!(collect_edges(&empty).is_empty());
    }
}
