//! Console implementations of the rendering collaborators.
//!
//! The terminal stands in for the map view: markers are printed when they
//! appear and when they expire, and notifications are styled messages.

use console::style;

use placepulse::coord::GeoPoint;
use placepulse::render::{MapRenderer, MarkerHandle, Notifier};

/// Prints markers as console lines.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    next_handle: u64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapRenderer for ConsoleRenderer {
    fn render_point(&mut self, point: GeoPoint) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle::new(self.next_handle);
        println!(
            "{} marker {} at ({:.4}, {:.4})",
            style("+").green().bold(),
            handle.raw(),
            point.latitude(),
            point.longitude()
        );
        handle
    }

    fn remove_point(&mut self, handle: MarkerHandle) {
        println!(
            "{} marker {} expired",
            style("-").red().bold(),
            handle.raw()
        );
    }

    fn clear_all(&mut self) {
        println!("{}", style("map cleared").dim());
    }
}

/// Prints notifications as styled lines.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        println!("{}", style(message).yellow());
    }
}
