//! A small stack machine with a mark-and-sweep collected heap of scalars
//! and pairs. The operand stack is the only root set.

mod error;
mod format;
mod heap;
mod object;
mod stack;
mod visitor;
mod vm;

pub mod scenarios;

pub use error::GcError;
pub use heap::{Allocations, Heap};
pub use object::*;
pub use stack::*;
pub use visitor::{RootProvider, Visitable};
pub use vm::*;
