// ABOUTME: Phantom-typed identifiers handed out by the container runtime.
// ABOUTME: Keeps container handles and image references from being mixed up.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker for container handles.
pub enum ContainerMarker {}
/// Marker for resolved image references.
pub enum ImageMarker {}

/// An opaque runtime identifier tagged with the kind of resource it names.
///
/// A `ContainerId` cannot be passed where an `ImageId` is expected, even
/// though both wrap the string the runtime reported.
#[must_use = "IDs reference runtime resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// T is only a marker, so none of these may require T: Trait.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Handle of a materialized container.
pub type ContainerId = Id<ContainerMarker>;
/// Image reference a container is created from: either the declared
/// reference or the tag of a freshly built context.
pub type ImageId = Id<ImageMarker>;
