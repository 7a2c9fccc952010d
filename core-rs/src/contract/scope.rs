//! Scoped contract acquisition
//!
//! A contract scope wraps a method body. Entering the outermost scope for a
//! subject creates its handle, captures the snapshot and checks the
//! invariant; leaving it checks the invariant again and drops the handle.
//! Nested scopes for the same subject (a method calling another method on
//! `self`) reuse the handle and do not re-check the invariant.

use super::dispatch;
use super::registry::{self, Handle, SubjectKey};
use crate::errors::{ContractError, Result};
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::trace;

/// Typed view of the active handle, handed to the scope body.
///
/// `M` is the snapshot type captured when the handle was created. For
/// scopes acquired without a snapshot function it is `()`.
pub struct Contract<M: 'static = ()> {
    handle: Rc<Handle>,
    _snapshot: PhantomData<fn() -> M>,
}

impl<M: 'static> Contract<M> {
    fn new(handle: Rc<Handle>) -> Self {
        Self {
            handle,
            _snapshot: PhantomData,
        }
    }

    /// Snapshot captured when the handle was created.
    ///
    /// `None` when a nested scope asks for a different snapshot type than
    /// the outermost scope captured.
    pub fn original(&self) -> Option<&M> {
        self.handle.snapshot::<M>()
    }

    /// Per-thread serial of the underlying handle; equal serials mean the
    /// same handle was reused
    pub fn serial(&self) -> u64 {
        self.handle.serial()
    }

    /// Whether a condition is currently being evaluated on this handle
    pub fn is_locked(&self) -> bool {
        self.handle.is_locked()
    }

    pub fn precondition<P>(&self, precondition: P) -> Result<()>
    where
        P: FnOnce() -> anyhow::Result<()>,
    {
        dispatch::precondition_on(&self.handle, precondition)
    }

    pub fn postcondition<P>(&self, postcondition: P) -> Result<()>
    where
        P: FnOnce(&M) -> anyhow::Result<()>,
    {
        dispatch::postcondition_on::<M, P>(&self.handle, postcondition)
    }
}

/// One entry on the scope stack. Dropping it pops the stack and, once the
/// handle is no longer on the stack, removes it from the registry. Runs on
/// unwinding too, so a panicking body cannot leave stale state behind.
struct Frame {
    handle: Rc<Handle>,
    outermost: bool,
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some((popped, still_active)) = registry::pop() {
            debug_assert!(
                Rc::ptr_eq(&popped, &self.handle),
                "contract scopes released out of order"
            );
            if !still_active {
                registry::deregister(popped.key());
                trace!(
                    subject = popped.subject_type(),
                    serial = popped.serial(),
                    "contract released"
                );
            }
        }
    }
}

fn enter<T, M, I, S>(subject: &T, invariant: &I, snapshot: S) -> Result<Frame>
where
    M: 'static,
    I: Fn(&T) -> anyhow::Result<()>,
    S: FnOnce(&T) -> M,
{
    if let Some(handle) = registry::lookup(SubjectKey::of(subject)) {
        trace!(
            subject = handle.subject_type(),
            serial = handle.serial(),
            "contract reused"
        );
        registry::push(handle.clone());
        return Ok(Frame {
            handle,
            outermost: false,
        });
    }

    let handle = Rc::new(Handle::new(subject, Box::new(snapshot(subject))));
    registry::register(handle.clone());
    registry::push(handle.clone());
    trace!(
        subject = handle.subject_type(),
        serial = handle.serial(),
        "contract acquired"
    );

    let frame = Frame {
        handle,
        outermost: true,
    };
    dispatch::check_invariant(&frame.handle, subject, invariant)?;
    Ok(frame)
}

fn exit<T, I>(frame: Frame, subject: &T, invariant: &I) -> Result<()>
where
    I: Fn(&T) -> anyhow::Result<()>,
{
    let result = if frame.outermost {
        dispatch::check_invariant(&frame.handle, subject, invariant)
    } else {
        Ok(())
    };
    drop(frame);
    result
}

/// The body's own error wins over a failing release invariant
fn settle<R, E>(
    outcome: std::result::Result<R, E>,
    released: Result<()>,
) -> std::result::Result<R, E>
where
    E: From<ContractError>,
{
    let value = outcome?;
    released?;
    Ok(value)
}

/// Run `body` inside a contract scope for `subject`, without a snapshot.
///
/// The subject is identified by its address and type, so it must not move
/// while the scope is open. Subjects may borrow:
///
/// ```
/// use dbc_core::contract::{self, require};
/// use dbc_core::ContractError;
///
/// struct View<'a> {
///     name: &'a str,
/// }
///
/// impl View<'_> {
///     fn invariant(&self) -> anyhow::Result<()> {
///         require(!self.name.is_empty())?;
///         Ok(())
///     }
/// }
///
/// let owned = String::from("Max");
/// let view = View { name: &owned };
/// let len: Result<usize, ContractError> =
///     contract::acquire(&view, View::invariant, |_| Ok(view.name.len()));
/// assert_eq!(len.unwrap(), 3);
/// ```
pub fn acquire<T, I, B, R, E>(subject: &T, invariant: I, body: B) -> std::result::Result<R, E>
where
    I: Fn(&T) -> anyhow::Result<()>,
    B: FnOnce(&Contract<()>) -> std::result::Result<R, E>,
    E: From<ContractError>,
{
    acquire_with(subject, invariant, |_| (), body)
}

/// Run `body` inside a contract scope for `subject`, capturing
/// `snapshot(subject)` as the original state for postconditions.
pub fn acquire_with<T, M, I, S, B, R, E>(
    subject: &T,
    invariant: I,
    snapshot: S,
    body: B,
) -> std::result::Result<R, E>
where
    M: 'static,
    I: Fn(&T) -> anyhow::Result<()>,
    S: FnOnce(&T) -> M,
    B: FnOnce(&Contract<M>) -> std::result::Result<R, E>,
    E: From<ContractError>,
{
    let frame = enter(subject, &invariant, snapshot)?;
    let contract = Contract::new(frame.handle.clone());

    let outcome = body(&contract);
    drop(contract);

    let released = exit(frame, subject, &invariant);
    settle(outcome, released)
}

/// Mutating counterpart of [`acquire`]: the subject is lent to the body.
pub fn acquire_mut<T, I, B, R, E>(
    subject: &mut T,
    invariant: I,
    body: B,
) -> std::result::Result<R, E>
where
    I: Fn(&T) -> anyhow::Result<()>,
    B: FnOnce(&mut T, &Contract<()>) -> std::result::Result<R, E>,
    E: From<ContractError>,
{
    acquire_mut_with(subject, invariant, |_| (), body)
}

/// Mutating counterpart of [`acquire_with`].
pub fn acquire_mut_with<T, M, I, S, B, R, E>(
    subject: &mut T,
    invariant: I,
    snapshot: S,
    body: B,
) -> std::result::Result<R, E>
where
    M: 'static,
    I: Fn(&T) -> anyhow::Result<()>,
    S: FnOnce(&T) -> M,
    B: FnOnce(&mut T, &Contract<M>) -> std::result::Result<R, E>,
    E: From<ContractError>,
{
    let frame = enter(&*subject, &invariant, snapshot)?;
    let contract = Contract::new(frame.handle.clone());

    let outcome = body(&mut *subject, &contract);
    drop(contract);

    let released = exit(frame, &*subject, &invariant);
    settle(outcome, released)
}
