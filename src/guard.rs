//! Wrappers that add timing, confirmation and error logging to an operation.
//!
//! Each wrapper takes an operation `FnMut(I) -> Result<T>` and hands back another
//! with the same signature, so they stack in any order.

use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::error::{DbError, Result};

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub fn confirmation_prompt(action: &str) -> String {
    format!("Are you sure you want to run \"{action}\"? [y/n]: ")
}

/// Accepts `y` in any case; everything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

pub fn with_timing<I, T>(
    name: &str,
    mut report: impl FnMut(&str, Duration),
    mut op: impl FnMut(I) -> Result<T>,
) -> impl FnMut(I) -> Result<T> {
    move |input| {
        let start = Instant::now();
        let out = op(input);
        let elapsed = start.elapsed();
        debug!(op = name, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "operation finished");
        report(name, elapsed);
        out
    }
}

/// Runs `op` only after `confirm` approves; otherwise fails with [`DbError::Cancelled`].
pub fn with_confirmation<I, T, C: Confirm>(
    action: &str,
    confirm: &mut C,
    mut op: impl FnMut(I) -> Result<T>,
) -> impl FnMut(I) -> Result<T> {
    move |input| {
        if !confirm.confirm(&confirmation_prompt(action)) {
            return Err(DbError::Cancelled(action.to_string()));
        }
        op(input)
    }
}

pub fn with_error_log<I, T>(mut op: impl FnMut(I) -> Result<T>) -> impl FnMut(I) -> Result<T> {
    move |input| {
        op(input).inspect_err(|e| match e {
            DbError::Cancelled(_) => debug!(error = %e, "operation cancelled"),
            _ if e.is_io() => error!(error = %e, "storage failure"),
            _ => debug!(error = %e, "operation failed"),
        })
    }
}
