use std::fmt::Write;

use crate::{Heap, Machine, ObjectRef, Payload};

const DEFAULT_MAX_DEPTH: usize = 4;

impl Machine {
    /// Prints the current root stack to stdout.
    pub fn print_roots(&self) {
        println!("--- Roots ({}):", self.depth());
        print!("{}", self.roots_to_string());
    }

    /// One line per root, top of the stack first.
    #[must_use]
    pub fn roots_to_string(&self) -> String {
        let depth = self.depth();
        let mut output = String::new();
        for i in 0..depth {
            let Some(root) = self.roots().get_nth(i) else {
                break;
            };
            let pretty = self.pretty_print(root, DEFAULT_MAX_DEPTH);
            let _ = writeln!(&mut output, "[{:02}] {}", depth - i - 1, pretty);
        }
        output
    }

    /// Renders an object graph. Pairs nested deeper than `max_depth` print
    /// as `(...)`, which also cuts cycles short.
    #[must_use]
    pub fn pretty_print(&self, object: ObjectRef, max_depth: usize) -> String {
        let mut output = String::new();
        pretty_print_internal(
            self.heap(),
            Some(object),
            0,
            max_depth,
            &mut output,
        );
        output
    }

    /// Dumps the allocation list, newest cell first.
    #[must_use]
    pub fn allocations_to_string(&self) -> String {
        let mut output = String::new();
        for (reference, object) in self.heap().allocations() {
            let _ = write!(
                &mut output,
                "{} gen {} {:?}",
                reference,
                reference.generation(),
                object.kind()
            );
            match object.payload() {
                Payload::Scalar { value } => {
                    let _ = write!(&mut output, " {value}");
                }
                Payload::Pair { first, second } => {
                    let _ = write!(
                        &mut output,
                        " {} {}",
                        link_name(*first),
                        link_name(*second)
                    );
                }
            }
            output.push('\n');
        }
        output
    }
}

fn link_name(link: Option<ObjectRef>) -> String {
    link.map_or_else(|| "nil".to_string(), |r| r.to_string())
}

fn pretty_print_internal(
    heap: &Heap,
    object: Option<ObjectRef>,
    depth: usize,
    max_depth: usize,
    output: &mut String,
) {
    let Some(object) = object else {
        output.push_str("nil");
        return;
    };
    let Some(cell) = heap.get(object) else {
        let _ = write!(output, "<freed {object}>");
        return;
    };

    match cell.payload() {
        Payload::Scalar { value } => {
            let _ = write!(output, "{value}");
        }
        Payload::Pair { .. } if depth >= max_depth => {
            output.push_str("(...)");
        }
        Payload::Pair { first, second } => {
            output.push('(');
            pretty_print_internal(heap, *first, depth + 1, max_depth, output);
            output.push_str(" . ");
            pretty_print_internal(heap, *second, depth + 1, max_depth, output);
            output.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Machine;

    #[test]
    fn roots_print_top_first() {
        let mut vm = Machine::new();
        vm.push_scalar(1).unwrap();
        vm.push_scalar(2).unwrap();

        assert_eq!(vm.roots_to_string(), "[01] 2\n[00] 1\n");
    }

    #[test]
    fn pairs_print_first_then_second() {
        let mut vm = Machine::new();
        vm.push_scalar(1).unwrap();
        vm.push_scalar(2).unwrap();
        vm.make_pair().unwrap();
        vm.push_scalar(3).unwrap();
        let pair = vm.make_pair().unwrap();

        assert_eq!(vm.pretty_print(pair, 4), "(3 . (2 . 1))");
        assert_eq!(vm.pretty_print(pair, 1), "(3 . (...))");
    }

    #[test]
    fn cycles_are_cut_at_max_depth() {
        let mut vm = Machine::new();
        vm.push_scalar(1).unwrap();
        vm.push_scalar(2).unwrap();
        let pair = vm.make_pair().unwrap();
        vm.heap_mut().set_pair(pair, pair, pair);

        assert_eq!(vm.pretty_print(pair, 1), "((...) . (...))");
    }

    #[test]
    fn freed_objects_are_marked_as_such() {
        let mut vm = Machine::new();
        let a = vm.push_scalar(1).unwrap();
        vm.pop_root();
        vm.collect();

        assert_eq!(vm.pretty_print(a, 4), format!("<freed {a}>"));
    }

    #[test]
    fn allocation_dump_lists_newest_first() {
        let mut vm = Machine::new();
        let a = vm.push_scalar(7).unwrap();
        vm.push_scalar(8).unwrap();
        vm.make_pair().unwrap();

        let dump = vm.allocations_to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Pair"));
        assert!(lines[2].ends_with("Scalar 7"));
        assert!(lines[2].starts_with(&a.to_string()));
    }
}
