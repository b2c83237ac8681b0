// src/core/retry.rs
use std::{thread, time::Duration};

/// Run `op` up to `attempts` times with incremental backoff (`step`, then
/// `2*step`, ...) between tries. `retryable` decides whether an error is worth
/// another attempt; a non-retryable error is returned immediately.
///
/// Both action primitives go through here, so retry policy lives in one place.
pub fn with_backoff<T, E>(
    attempts: u32,
    step: Duration,
    mut op: impl FnMut(u32) -> Result<T, E>,
    mut retryable: impl FnMut(&E) -> bool,
) -> Result<T, E> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= attempts || !retryable(&e) => return Err(e),
            Err(_) => thread::sleep(step * attempt),
        }
    }
}
