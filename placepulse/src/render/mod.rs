//! Rendering and notification collaborator traits.
//!
//! The engine never draws anything itself. The embedding application
//! supplies a [`MapRenderer`] that places and removes markers on whatever
//! display surface it owns, and a [`Notifier`] that shows short messages
//! to the user (errors, request summaries, validation feedback).
//!
//! Both collaborators are only ever called from the session daemon task,
//! so implementations do not need internal synchronization.

use crate::coord::GeoPoint;

/// Opaque reference to a rendered marker.
///
/// Handles are issued by the [`MapRenderer`] and handed back to it when a
/// marker expires. The engine attaches no meaning to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    /// Creates a handle from a renderer-chosen value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the renderer-chosen value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Display surface for markers.
pub trait MapRenderer: Send + 'static {
    /// Renders a marker at the given position and returns its handle.
    fn render_point(&mut self, point: GeoPoint) -> MarkerHandle;

    /// Removes a previously rendered marker.
    fn remove_point(&mut self, handle: MarkerHandle);

    /// Removes every rendered marker.
    fn clear_all(&mut self);
}

/// User-facing notification sink.
pub trait Notifier: Send + 'static {
    /// Shows a short message to the user.
    fn notify(&mut self, message: &str);
}
