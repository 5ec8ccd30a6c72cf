//! Per-transaction routing context.

use uuid::Uuid;

/// A transaction-scoped boundary and its read/write intent.
///
/// Created by whatever owns the transaction and handed to the router
/// explicitly; nothing is read from thread-local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWork {
    id: Uuid,
    name: Option<String>,
    read_only: bool,
}

impl UnitOfWork {
    pub fn new(read_only: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            read_only,
        }
    }

    /// A unit of work that only reads; eligible for a replica.
    pub fn read_only() -> Self {
        Self::new(true)
    }

    /// A unit of work that may write; always served by the primary.
    pub fn read_write() -> Self {
        Self::new(false)
    }

    /// Attach a human-readable name, e.g. the service method it wraps.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}
