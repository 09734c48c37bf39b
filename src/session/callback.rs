//! Optional notification hook.

use std::fmt;

/// Wrapper around an optional `Fn(T)` handler.
///
/// Used for the verification hook: the session calls it with every result
/// and does not look at what the embedding application does with it.
pub struct Callback<T> {
    f: Option<Box<dyn Fn(T)>>,
}

impl<T> Callback<T> {
    /// Create a new callback from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) + 'static,
    {
        Self {
            f: Some(Box::new(f)),
        }
    }

    /// Create an empty callback (no handler).
    pub fn none() -> Self {
        Self { f: None }
    }

    /// Call the handler with a value, if one is set.
    ///
    /// Returns `true` if a handler ran.
    pub fn call(&self, value: T) -> bool {
        match &self.f {
            Some(f) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Check if a handler is set.
    pub fn is_some(&self) -> bool {
        self.f.is_some()
    }
}

impl<T> Default for Callback<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("is_set", &self.f.is_some())
            .finish()
    }
}
