//! The markup a view hosts, versioned by a generation counter.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SurfaceState {
    generation: u64,
    html: String,
}

/// Shared handle to hosted markup. Cloning shares the same surface.
///
/// Every `replace` bumps the generation; a hydration pass that started on an
/// older generation must not write into the new markup.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl Surface {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SurfaceState {
                generation: 0,
                html: html.into(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        // A panic elsewhere never leaves the markup half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Swaps in new markup and returns the new generation.
    pub fn replace(&self, html: impl Into<String>) -> u64 {
        let mut state = self.state();
        state.generation += 1;
        state.html = html.into();
        state.generation
    }

    pub fn html(&self) -> String {
        self.state().html.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Current generation and markup, read under one lock.
    pub(super) fn snapshot(&self) -> (u64, String) {
        let state = self.state();
        (state.generation, state.html.clone())
    }

    /// Applies `edit` only if the surface is still at `generation`.
    /// Returns `None` when the pass has been superseded.
    pub(super) fn edit_if_current<F, R>(&self, generation: u64, edit: F) -> Option<R>
    where
        F: FnOnce(&mut String) -> R,
    {
        let mut state = self.state();
        if state.generation != generation {
            return None;
        }
        Some(edit(&mut state.html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_bumps_generation() {
        let surface = Surface::new("<p>a</p>");
        assert_eq!(surface.generation(), 0);
        assert_eq!(surface.replace("<p>b</p>"), 1);
        assert_eq!(surface.html(), "<p>b</p>");
    }

    #[test]
    fn test_stale_edit_is_dropped() {
        let surface = Surface::new("old");
        let (generation, _) = surface.snapshot();
        surface.replace("new");
        assert!(surface.edit_if_current(generation, |html| html.push('!')).is_none());
        assert_eq!(surface.html(), "new");
        assert!(surface.edit_if_current(1, |html| html.push('!')).is_some());
        assert_eq!(surface.html(), "new!");
    }
}
