//! Generic scoped acquisition: a resource paired with a release action.

use std::fmt;
use std::ops::{Deref, DerefMut};

type Release<T> = Box<dyn FnOnce(T) + Send>;

/// Scoped handle - runs its release action exactly once.
///
/// The action fires on drop (normal exit, `?` early return, or unwinding)
/// unless [`Scoped::release`] or [`Scoped::into_inner`] consumed it first.
pub struct Scoped<T> {
    inner: Option<(T, Release<T>)>,
}

impl<T> Scoped<T> {
    pub fn new<F>(resource: T, release: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Self {
            inner: Some((resource, Box::new(release))),
        }
    }

    /// Run the release action now instead of at end of scope.
    pub fn release(mut self) {
        if let Some((resource, release)) = self.inner.take() {
            release(resource);
        }
    }

    /// Take the resource back without releasing it.
    pub fn into_inner(mut self) -> T {
        match self.inner.take() {
            Some((resource, _)) => resource,
            None => unreachable!("scoped resource is only taken by consuming methods"),
        }
    }

    fn resource(&self) -> &T {
        match &self.inner {
            Some((resource, _)) => resource,
            None => unreachable!("scoped resource is only taken by consuming methods"),
        }
    }

    fn resource_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some((resource, _)) => resource,
            None => unreachable!("scoped resource is only taken by consuming methods"),
        }
    }
}

impl<T> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.resource()
    }
}

impl<T> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.resource_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for Scoped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scoped")
            .field("resource", &self.inner.as_ref().map(|(r, _)| r))
            .finish()
    }
}

impl<T> Drop for Scoped<T> {
    fn drop(&mut self) {
        if let Some((resource, release)) = self.inner.take() {
            if std::thread::panicking() {
                tracing::warn!("Releasing scoped resource during unwind");
            }
            release(resource);
        }
    }
}
