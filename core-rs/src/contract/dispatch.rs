//! Guarded check dispatch
//!
//! Every check, whatever its kind, goes through [`run_guarded`]:
//! no active handle or a locked handle makes the check a no-op, otherwise
//! the handle is locked for the duration of the body and the body's failure
//! is classified into a [`ContractError`].

use super::condition::ConditionKind;
use super::registry::{self, Handle};
use crate::config;
use crate::errors::{ConditionPanicked, ContractError, Result, SnapshotUnavailable};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Clears the reentrancy flag on drop, including during unwinding
struct LockGuard<'h> {
    handle: &'h Handle,
}

impl<'h> LockGuard<'h> {
    fn engage(handle: &'h Handle) -> Self {
        handle.set_locked(true);
        Self { handle }
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.handle.set_locked(false);
    }
}

pub(crate) fn run_guarded<F>(handle: &Handle, kind: ConditionKind, body: F) -> Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let config = config::current();
    if !config.enabled {
        return Ok(());
    }

    if handle.is_locked() {
        debug!(
            subject = handle.subject_type(),
            serial = handle.serial(),
            %kind,
            "check suppressed, contract is already being evaluated"
        );
        return Ok(());
    }

    let outcome = {
        let _lock = LockGuard::engage(handle);
        if config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(body))
                .unwrap_or_else(|payload| Err(ConditionPanicked::from_payload(payload).into()))
        } else {
            body()
        }
    };

    outcome.map_err(|err| {
        let err = ContractError::classify(kind, err);
        if config.log_violations {
            warn!(
                subject = handle.subject_type(),
                serial = handle.serial(),
                %kind,
                error = %err,
                "contract check failed"
            );
        }
        err
    })
}

/// Run the invariant bound to `handle` against its subject
pub(crate) fn check_invariant<T, I>(handle: &Handle, subject: &T, invariant: &I) -> Result<()>
where
    T: ?Sized,
    I: Fn(&T) -> anyhow::Result<()>,
{
    run_guarded(handle, ConditionKind::Invariant, || invariant(subject))
}

pub(crate) fn precondition_on<P>(handle: &Handle, precondition: P) -> Result<()>
where
    P: FnOnce() -> anyhow::Result<()>,
{
    run_guarded(handle, ConditionKind::Precondition, precondition)
}

pub(crate) fn postcondition_on<M, P>(handle: &Handle, postcondition: P) -> Result<()>
where
    M: 'static,
    P: FnOnce(&M) -> anyhow::Result<()>,
{
    run_guarded(handle, ConditionKind::Postcondition, || {
        let original = handle.snapshot::<M>().ok_or(SnapshotUnavailable {
            expected: std::any::type_name::<M>(),
        })?;
        postcondition(original)
    })
}

/// Check a precondition against the innermost active contract.
///
/// A no-op when no contract is active on this thread, or when the active
/// contract is already evaluating a condition.
pub fn check_precondition<P>(precondition: P) -> Result<()>
where
    P: FnOnce() -> anyhow::Result<()>,
{
    match registry::top() {
        Some(handle) => precondition_on(&handle, precondition),
        None => Ok(()),
    }
}

/// Check a postcondition against the innermost active contract.
///
/// The postcondition receives the snapshot captured at acquisition. Asking
/// for a snapshot type other than the one captured fails as not verifiable.
pub fn check_postcondition<M, P>(postcondition: P) -> Result<()>
where
    M: 'static,
    P: FnOnce(&M) -> anyhow::Result<()>,
{
    match registry::top() {
        Some(handle) => postcondition_on(&handle, postcondition),
        None => Ok(()),
    }
}
