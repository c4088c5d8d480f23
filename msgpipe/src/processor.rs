//! Processor identity.
//!
//! A processor is the pipeline stage a failure is attributed to. Failures
//! only ever hold a [`ProcessorRef`], which identifies the processor without
//! keeping it alive.

use std::fmt;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// An identifiable pipeline stage.
pub trait Processor: Send + Sync {
    /// Returns the stable, human-readable name of the processor.
    fn name(&self) -> &str;

    /// Returns the stable id of the processor instance.
    fn id(&self) -> Uuid;
}

/// Non-owning handle on a [`Processor`].
///
/// The id and display name are captured when the handle is created so they
/// stay readable after the processor itself is dropped.
#[derive(Clone)]
pub struct ProcessorRef {
    id: Uuid,
    name: String,
    target: Option<Weak<dyn Processor>>,
}

impl ProcessorRef {
    /// Creates a handle on a shared processor.
    #[must_use]
    pub fn of<P: Processor + 'static>(processor: &Arc<P>) -> Self {
        let weak: Weak<P> = Arc::downgrade(processor);
        let target: Weak<dyn Processor> = weak;
        Self::from_weak(processor.id(), processor.name(), target)
    }

    /// Creates a handle from an already downgraded processor.
    ///
    /// Used by processors that hold a reference to themselves, which only
    /// exists as a `Weak` while they are being constructed.
    #[must_use]
    pub fn from_weak(id: Uuid, name: impl Into<String>, target: Weak<dyn Processor>) -> Self {
        Self {
            id,
            name: name.into(),
            target: Some(target),
        }
    }

    /// Creates a handle for a processor that is known only by name.
    ///
    /// [`upgrade`](Self::upgrade) always returns `None` for such handles.
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target: None,
        }
    }

    /// Returns the processor id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the display name captured at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks the processor up, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<dyn Processor>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }
}

impl PartialEq for ProcessorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for ProcessorRef {}

impl fmt::Debug for ProcessorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRef")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ProcessorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
