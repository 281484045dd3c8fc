//! # Editor Core
//!
//! Editing core for a single-page canvas designer: element store, event
//! bus, selection, drag and resize gestures, snapshot history, layout
//! rendering and zoom. Compiles to WASM for the browser host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  EditorSession   │  Controllers             │
//! │  - Element store │  - Selection             │
//! │  - Visual tree   │  - Drag / Resize         │
//! │  - Viewport      │  - History               │
//! ├─────────────────────────────────────────────┤
//! │  Renderer        │  EventBus                │
//! │  - Layout JSON   │  - Panel notifications   │
//! │  - Snapshots     │  - Handler isolation     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod config;
pub mod drag;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod history;
pub mod renderer;
pub mod resize;
pub mod schema;
pub mod selection;
pub mod session;
pub mod store;
pub mod style;
pub mod viewport;
pub mod visual;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bus::{EditorEvent, EventBus, EventKind, PublishOutcome};
pub use config::EditorConfig;
pub use drag::DragController;
pub use editor::{Editor, PointerTarget};
pub use element::{
    EditableProperty, ElementId, ElementKind, ElementPatch, ElementRecord, ElementType, Point,
    Rect, ShapeKind,
};
pub use error::{EditorError, EditorResult};
pub use event::{InputEvent, KeyEvent, PointerEvent, PointerPhase};
pub use history::{HistoryManager, Snapshot};
pub use renderer::{Notice, NoticeLevel, RenderReport, Renderer};
pub use resize::{HandlePosition, ResizeController, ResizeHandle};
pub use schema::{CanvasDescriptor, CanvasDocument, GenerationRequest, LayoutDescription};
pub use selection::SelectionController;
pub use session::{EditorSession, GestureCommit, Interaction};
pub use store::CanvasElementStore;
pub use style::{Color, Length, Style, StyleKey, StyleProperty};
pub use viewport::ViewportController;

/// Editor core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
