//! The live editing session.
//!
//! [`EditorSession`] is the one context object every controller works
//! against. The editor owns it and lends it out per operation; there is no
//! global state.

use crate::visual::VisualTree;
use crate::{
    CanvasDescriptor, CanvasDocument, CanvasElementStore, EditorConfig, EditorError, EditorResult,
    ElementId, Rect, ViewportController,
};

/// Interactive gesture currently holding the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// A drag is in progress.
    Dragging,
    /// A resize is in progress.
    Resizing,
}

impl Interaction {
    const fn name(self) -> &'static str {
        match self {
            Self::Dragging => "dragging",
            Self::Resizing => "resizing",
        }
    }
}

/// Outcome of a drag or resize that reached the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureCommit {
    /// Element that was changed.
    pub element_id: ElementId,
    /// Gesture that produced the change.
    pub interaction: Interaction,
    /// Committed geometry in unscaled units.
    pub geometry: Rect,
}

/// Aggregate state of one editing session.
#[derive(Debug)]
pub struct EditorSession {
    pub(crate) config: EditorConfig,
    pub(crate) canvas: CanvasDescriptor,
    pub(crate) store: CanvasElementStore,
    pub(crate) visuals: VisualTree,
    pub(crate) selected: Option<ElementId>,
    pub(crate) viewport: ViewportController,
    busy: Option<Interaction>,
}

impl EditorSession {
    /// Create an empty session with the default canvas.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let viewport = ViewportController::new(&config);
        Self {
            config,
            canvas: CanvasDescriptor::default(),
            store: CanvasElementStore::new(),
            visuals: VisualTree::new(),
            selected: None,
            viewport,
            busy: None,
        }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Canvas size and background.
    #[must_use]
    pub const fn canvas(&self) -> &CanvasDescriptor {
        &self.canvas
    }

    /// Canvas size in unscaled units.
    #[must_use]
    pub const fn original_size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    /// Authoritative element records.
    #[must_use]
    pub const fn store(&self) -> &CanvasElementStore {
        &self.store
    }

    /// Visual tree.
    #[must_use]
    pub const fn visuals(&self) -> &VisualTree {
        &self.visuals
    }

    /// Selected element id.
    #[must_use]
    pub const fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Viewport.
    #[must_use]
    pub const fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// Current display scale.
    #[must_use]
    pub const fn display_scale(&self) -> f32 {
        self.viewport.scale()
    }

    /// Gesture in progress, if any.
    #[must_use]
    pub const fn busy(&self) -> Option<Interaction> {
        self.busy
    }

    /// Claim the session for a gesture.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Busy`] if another gesture holds it.
    pub(crate) fn acquire(&mut self, interaction: Interaction) -> EditorResult<()> {
        if let Some(current) = self.busy {
            return Err(EditorError::Busy(format!(
                "cannot start {} while {}",
                interaction.name(),
                current.name()
            )));
        }
        self.busy = Some(interaction);
        Ok(())
    }

    /// Release the session after a gesture.
    pub(crate) fn release(&mut self) {
        self.busy = None;
    }

    /// JSON view of the session.
    #[must_use]
    pub fn document(&self) -> CanvasDocument {
        CanvasDocument {
            canvas: self.canvas,
            elements: self.store.all().to_vec(),
            selected_element_id: self.selected.clone(),
            zoom: self.viewport.scale(),
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
