//! Stack safety for the recursive phases (parsing deeply nested expressions,
//! evaluating deeply recursive Hi functions).
//!
//! Recursion depth in the interpreter is bounded by an explicit call-depth
//! counter; this module makes sure the *native* stack never runs out before
//! that counter does, by growing it on demand.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
