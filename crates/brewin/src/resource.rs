//! Ambient recursion guard. The spec leaves wall-clock timeouts to the host,
//! but nothing stops an unbounded recursive Brewin' program from overflowing
//! the native stack before the host's timeout gets a chance to fire — so, in
//! the manner of the teacher's `ResourceError::Recursion`, the call machinery
//! tracks its own depth and fails cleanly instead of aborting the process.

/// Maximum nested `do_func_call`/method-call depth before evaluation fails
/// with [`crate::error::EvalError::RecursionLimit`].
pub const MAX_CALL_DEPTH: usize = 2_000;
