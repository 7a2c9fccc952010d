//! Per-thread contract registry and scope stack
//!
//! Both structures live in thread-local storage, are allocated on first use
//! and released again as soon as they become empty. Nothing here is shared
//! between threads: handles are `Rc` based and never leave the thread that
//! created them.

use std::any::{self, Any};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static REGISTRY: RefCell<Option<HashMap<SubjectKey, Rc<Handle>>>> =
        const { RefCell::new(None) };
    static SCOPE_STACK: RefCell<Option<Vec<Rc<Handle>>>> = const { RefCell::new(None) };
    static NEXT_SERIAL: Cell<u64> = const { Cell::new(1) };
}

/// Identity of a subject: its address plus its concrete type.
///
/// Structurally equal subjects at different addresses get different keys.
/// The type name keeps a struct and its first field apart even though they
/// share an address. Lifetimes are erased from the name, so subjects that
/// borrow (`View<'a>`) are keyed like any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubjectKey {
    addr: usize,
    type_name: &'static str,
    size: usize,
}

impl SubjectKey {
    pub(crate) fn of<T>(subject: &T) -> Self {
        Self {
            addr: subject as *const T as usize,
            type_name: any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
        }
    }
}

/// Active contract state for one subject on one thread
pub(crate) struct Handle {
    key: SubjectKey,
    serial: u64,
    subject_type: &'static str,
    snapshot: Box<dyn Any>,
    locked: Cell<bool>,
}

impl Handle {
    pub(crate) fn new<T>(subject: &T, snapshot: Box<dyn Any>) -> Self {
        let serial = NEXT_SERIAL.with(|next| {
            let serial = next.get();
            next.set(serial + 1);
            serial
        });

        Self {
            key: SubjectKey::of(subject),
            serial,
            subject_type: any::type_name::<T>(),
            snapshot,
            locked: Cell::new(false),
        }
    }

    pub(crate) fn key(&self) -> SubjectKey {
        self.key
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn subject_type(&self) -> &'static str {
        self.subject_type
    }

    pub(crate) fn snapshot<M: 'static>(&self) -> Option<&M> {
        self.snapshot.downcast_ref::<M>()
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub(crate) fn set_locked(&self, locked: bool) {
        self.locked.set(locked);
    }
}

pub(crate) fn lookup(key: SubjectKey) -> Option<Rc<Handle>> {
    REGISTRY.with(|registry| {
        registry
            .borrow()
            .as_ref()
            .and_then(|map| map.get(&key).cloned())
    })
}

pub(crate) fn register(handle: Rc<Handle>) {
    REGISTRY.with(|registry| {
        registry
            .borrow_mut()
            .get_or_insert_with(HashMap::new)
            .insert(handle.key(), handle);
    });
}

pub(crate) fn deregister(key: SubjectKey) {
    REGISTRY.with(|registry| {
        let mut slot = registry.borrow_mut();
        if let Some(map) = slot.as_mut() {
            map.remove(&key);
            if map.is_empty() {
                *slot = None;
            }
        }
    });
}

pub(crate) fn push(handle: Rc<Handle>) {
    SCOPE_STACK.with(|stack| {
        stack.borrow_mut().get_or_insert_with(Vec::new).push(handle);
    });
}

/// Pop the top of the scope stack.
///
/// Returns the popped handle and whether it is still present further down
/// the stack (a nested acquisition of the same subject).
pub(crate) fn pop() -> Option<(Rc<Handle>, bool)> {
    SCOPE_STACK.with(|stack| {
        let mut slot = stack.borrow_mut();
        let frames = slot.as_mut()?;
        let handle = frames.pop()?;
        let still_active = frames.iter().any(|h| Rc::ptr_eq(h, &handle));
        if frames.is_empty() {
            *slot = None;
        }
        Some((handle, still_active))
    })
}

/// The handle ambient checks target, if any
pub(crate) fn top() -> Option<Rc<Handle>> {
    SCOPE_STACK.with(|stack| {
        stack
            .borrow()
            .as_ref()
            .and_then(|frames| frames.last().cloned())
    })
}

/// Number of subjects with an active contract on this thread
pub fn active_contracts() -> usize {
    REGISTRY.with(|registry| registry.borrow().as_ref().map_or(0, HashMap::len))
}

/// Number of open contract scopes on this thread, nested ones included
pub fn scope_depth() -> usize {
    SCOPE_STACK.with(|stack| stack.borrow().as_ref().map_or(0, Vec::len))
}

/// Whether `subject` currently has an active contract on this thread
pub fn is_active<T>(subject: &T) -> bool {
    lookup(SubjectKey::of(subject)).is_some()
}

/// Whether this thread currently holds any registry or scope-stack storage
pub fn thread_state_allocated() -> bool {
    let registry = REGISTRY.with(|registry| registry.borrow().is_some());
    let stack = SCOPE_STACK.with(|stack| stack.borrow().is_some());
    registry || stack
}
