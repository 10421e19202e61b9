use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GcError {
    /// The memory provider could not grow the heap arena, or the arena
    /// already holds `u32::MAX` slots. Neither is reachable from a unit test
    /// without exhausting the host, so only the message is checked below.
    #[error("out of memory: the heap arena could not grow")]
    OutOfMemory,
    /// The configured object limit is still reached after a collection.
    #[error("heap exhausted: {live} objects live, limit is {limit}")]
    HeapExhausted { live: usize, limit: usize },
    #[error("invalid machine settings: {0}")]
    InvalidSettings(&'static str),
}
