//! Listener handles.
//!
//! A [`Listener`] is a cheap, cloneable handle around a callback. Identity is
//! the shared allocation: clones compare equal, while two handles built from
//! identical closures do not. Keep a clone around to remove the listener
//! later.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Closure type for event listeners.
pub type ListenerFn<A> = dyn Fn(&A) + Send + Sync;

/// Identity of a [`Listener`] allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener@{:#x}", self.0)
    }
}

pub struct Listener<A> {
    callback: Arc<ListenerFn<A>>,
}

impl<A> Listener<A> {
    pub fn new(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        ListenerId(Arc::as_ptr(&self.callback) as *const () as usize)
    }

    pub fn call(&self, args: &A) {
        (self.callback)(args)
    }
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<A> Eq for Listener<A> {}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id()).finish()
    }
}

/// A listener with its argument type erased, as stored in the registry.
#[derive(Clone)]
pub(crate) struct ErasedListener {
    id: ListenerId,
    handle: Arc<dyn Any + Send + Sync>,
}

impl ErasedListener {
    pub(crate) fn new<A: 'static>(listener: Listener<A>) -> Self {
        Self {
            id: listener.id(),
            handle: Arc::new(listener),
        }
    }

    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn downcast<A: 'static>(&self) -> Option<&Listener<A>> {
        self.handle.downcast_ref()
    }
}
