use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use crate::types::ParticipantId;
use crate::value::Value;

type Attachment = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct ContextInner {
    values: RwLock<BTreeMap<String, Value>>,
    attachments: Mutex<HashMap<ParticipantId, Attachment>>,
}

/// Per-transaction store shared by every participant that handles the transaction.
///
/// Cloning yields another handle to the same store. Besides plain values, each
/// participant may attach one piece of opaque state, keyed by its [`ParticipantId`],
/// which lives exactly as long as the context.
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every value currently stored.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.inner
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// State previously attached by `owner`, if it has the requested type.
    pub fn attachment<T>(&self, owner: ParticipantId) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let attachments = self
            .inner
            .attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        attachments
            .get(&owner)
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Returns the state attached by `owner`, creating it with `make` when absent.
    ///
    /// The lookup and the insert happen under one lock, so `make` runs at most once
    /// per owner even if callers race.
    pub fn get_or_attach_with<T, F>(&self, owner: ParticipantId, make: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut attachments = self
            .inner
            .attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = attachments
            .get(&owner)
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
        {
            return existing;
        }
        let created = Arc::new(make());
        attachments.insert(owner, created.clone() as Attachment);
        created
    }

    pub fn detach(&self, owner: ParticipantId) -> bool {
        self.inner
            .attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&owner)
            .is_some()
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn same_context(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Non-owning context handle; state attached to a context holds this instead of a
/// [`Context`] so the context can still be dropped by its owner.
#[derive(Clone, Debug, Default)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

impl WeakContext {
    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }
}

/// What the host hands a participant on each lifecycle call.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A full transaction context, able to carry per-participant state.
    Context(Context),
    /// A plain serializable payload with no attachment capability.
    Opaque(serde_json::Value),
}

impl Payload {
    pub fn context(&self) -> Option<&Context> {
        match self {
            Self::Context(context) => Some(context),
            Self::Opaque(_) => None,
        }
    }
}

impl From<Context> for Payload {
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Opaque(value)
    }
}
