//! Primitive assertion helpers used inside condition bodies
//!
//! `require` reports a bad argument, `ensure` and `check` report a bad
//! state. The `_with` variants take a message closure that only runs on
//! failure.

use crate::errors::AssertionError;

/// Trivially true precondition for operations that declare none
pub const NOTHING: bool = true;

pub fn require(condition: bool) -> Result<(), AssertionError> {
    if condition {
        Ok(())
    } else {
        Err(AssertionError::InvalidArgument(None))
    }
}

pub fn require_with<F>(condition: bool, msg: F) -> Result<(), AssertionError>
where
    F: FnOnce() -> String,
{
    if condition {
        Ok(())
    } else {
        Err(AssertionError::InvalidArgument(Some(msg())))
    }
}

pub fn ensure(condition: bool) -> Result<(), AssertionError> {
    if condition {
        Ok(())
    } else {
        Err(AssertionError::IllegalState(None))
    }
}

pub fn ensure_with<F>(condition: bool, msg: F) -> Result<(), AssertionError>
where
    F: FnOnce() -> String,
{
    if condition {
        Ok(())
    } else {
        Err(AssertionError::IllegalState(Some(msg())))
    }
}

/// Same failure kind as `ensure`; reads better inside invariants
pub fn check(condition: bool) -> Result<(), AssertionError> {
    ensure(condition)
}

pub fn check_with<F>(condition: bool, msg: F) -> Result<(), AssertionError>
where
    F: FnOnce() -> String,
{
    ensure_with(condition, msg)
}
