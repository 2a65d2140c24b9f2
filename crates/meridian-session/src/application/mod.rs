//! Application layer: the engine that drives a session against its
//! collaborators, and the background decay timers.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod config;
pub mod engine;
pub mod handle;
pub mod presenter;
pub(crate) mod timers;

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
