//! In-memory registry of rendered markers.
//!
//! Tracks which markers are currently on display together with their
//! lifespan index. The registry is not synchronized: it is owned by the
//! session daemon task and only ever touched from there, which also
//! serializes it against the expiry sweeps that mutate it.

use crate::render::MarkerHandle;

/// One marker on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedPoint {
    /// Renderer-issued handle, held only to request removal later.
    pub handle: MarkerHandle,

    /// Number of elapsed ticks after which the marker is removed.
    pub lifespan_index: u32,
}

/// The set of currently displayed markers.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    points: Vec<RenderedPoint>,
}

impl MarkerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rendered marker.
    pub fn add(&mut self, handle: MarkerHandle, lifespan_index: u32) {
        self.points.push(RenderedPoint {
            handle,
            lifespan_index,
        });
    }

    /// Removes every marker whose lifespan index matches and returns
    /// their handles in registration order.
    pub fn remove_matching(&mut self, lifespan_index: u32) -> Vec<MarkerHandle> {
        let mut removed = Vec::new();
        self.points.retain(|point| {
            if point.lifespan_index == lifespan_index {
                removed.push(point.handle);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drops every marker.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Currently registered markers, in registration order.
    pub fn points(&self) -> &[RenderedPoint] {
        &self.points
    }

    /// Number of registered markers.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when no markers are registered.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_len() {
        let mut registry = MarkerRegistry::new();
        assert!(registry.is_empty());

        registry.add(MarkerHandle::new(1), 0);
        registry.add(MarkerHandle::new(2), 3);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_matching_takes_only_matching() {
        let mut registry = MarkerRegistry::new();
        registry.add(MarkerHandle::new(1), 0);
        registry.add(MarkerHandle::new(2), 3);
        registry.add(MarkerHandle::new(3), 0);

        let removed = registry.remove_matching(0);
        assert_eq!(removed, vec![MarkerHandle::new(1), MarkerHandle::new(3)]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.points()[0].handle, MarkerHandle::new(2));
    }

    #[test]
    fn test_remove_matching_without_match() {
        let mut registry = MarkerRegistry::new();
        registry.add(MarkerHandle::new(1), 5);

        assert!(registry.remove_matching(4).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = MarkerRegistry::new();
        registry.add(MarkerHandle::new(1), 0);
        registry.clear();
        assert!(registry.is_empty());
    }
}
