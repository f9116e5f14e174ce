use core::fmt;
use std::{
    cell::Cell,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

static XID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_XID: Xid = Xid::next();
    static SESSION_XID: Cell<Option<Xid>> = Cell::new(None);
}

/// The identity of a latch requester.
///
/// It is only used to check the latch discipline (who holds what), it
/// carries no transactional meaning.
#[derive(Eq, Hash, PartialEq, PartialOrd, Ord, Clone, Copy)]
pub struct Xid {
    // increase monotonically by 1 when allocated by `next`
    id: u64,
}

impl Xid {
    /// Wrap a caller-supplied token.
    ///
    /// Tokens handed out by `next` start from 1 and never repeat, mixing
    /// them with hand-picked tokens is the caller's business.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Allocate a process-unique identity.
    pub fn next() -> Self {
        Self {
            id: XID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The identity of the calling context: the session bound to this
    /// thread by `enter`, or else an identity owned by the thread itself.
    pub fn current() -> Self {
        match SESSION_XID.with(|s| s.get()) {
            Some(xid) => xid,
            None => THREAD_XID.with(|xid| *xid),
        }
    }

    /// Bind this identity to the calling thread until the returned scope
    /// is dropped. Scopes nest, dropping one restores the previous
    /// binding.
    pub fn enter(self) -> SessionScope {
        let previous = SESSION_XID.with(|s| s.replace(Some(self)));
        SessionScope {
            previous,
            _not_send: PhantomData,
        }
    }

    pub fn get_id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "xid_{:x}", self.id)
    }
}

impl fmt::Debug for Xid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Keeps a session identity bound to the thread that created it.
#[must_use = "the session identity is unbound as soon as the scope is dropped"]
pub struct SessionScope {
    previous: Option<Xid>,
    // the binding lives in a thread local, restore it on the same thread
    _not_send: PhantomData<*const ()>,
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        let previous = self.previous;
        SESSION_XID.with(|s| s.set(previous));
    }
}
