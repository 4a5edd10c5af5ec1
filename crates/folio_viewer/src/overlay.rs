//! Overlay open/closed lifecycle and its document-wide side effects.
//!
//! While the overlay is open the host document must suppress native pinch
//! zoom, ctrl/cmd+wheel page zoom and route Escape to close. Those listeners
//! are installed on entering [`OverlayPhase::Open`] and removed on every way
//! out of it, including dropping the lifecycle.

use crate::error::Result;
use crate::event::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Closed,
    Open,
}

/// Document-level listeners scoped to the open overlay.
pub trait DocumentListeners {
    /// Install the keydown, wheel-capture and touch/gesture blockers.
    fn install(&mut self) -> Result<()>;

    /// Remove everything `install` added. Must be safe to call once per install.
    fn remove(&mut self);
}

/// Listeners for hosts without a document (tests, headless replay).
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedListeners;

impl DocumentListeners for DetachedListeners {
    fn install(&mut self) -> Result<()> {
        Ok(())
    }

    fn remove(&mut self) {}
}

#[derive(Debug)]
pub struct OverlayLifecycle<L: DocumentListeners> {
    phase: OverlayPhase,
    listeners: L,
    installed: bool,
}

impl<L: DocumentListeners> OverlayLifecycle<L> {
    pub fn new(listeners: L) -> Self {
        Self {
            phase: OverlayPhase::Closed,
            listeners,
            installed: false,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == OverlayPhase::Open
    }

    pub fn listeners(&self) -> &L {
        &self.listeners
    }

    /// Enter `Open`. Returns false if it was already open.
    ///
    /// A listener install failure is logged; the overlay still opens since
    /// the gestures themselves do not depend on the document blockers.
    pub fn open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.phase = OverlayPhase::Open;
        match self.listeners.install() {
            Ok(()) => self.installed = true,
            Err(e) => log::warn!("Overlay opened without document listeners: {}", e),
        }
        log::info!("Image overlay opened");
        true
    }

    /// Enter `Closed`. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.phase = OverlayPhase::Closed;
        self.release();
        log::info!("Image overlay closed");
        true
    }

    /// Browser ctrl/cmd+wheel zoom must be blocked while open.
    pub fn blocks_wheel(&self, modifiers: Modifiers) -> bool {
        self.is_open() && modifiers.is_zoom_chord()
    }

    /// Native multi-touch zoom must be blocked while open.
    pub fn blocks_touch(&self, touch_count: u32) -> bool {
        self.is_open() && touch_count > 1
    }

    fn release(&mut self) {
        if self.installed {
            self.listeners.remove();
            self.installed = false;
        }
    }
}

impl<L: DocumentListeners> Drop for OverlayLifecycle<L> {
    fn drop(&mut self) {
        self.release();
    }
}
