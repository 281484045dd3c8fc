//! # Canvas Edit
//!
//! Headless driver for the editor core.
//!
//! Loads a layout description, replays an edit script against an
//! [`Editor`] and returns the final canvas document. Useful for
//! reproducing editing sessions outside the browser.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p editor-cli -- --layout poster.json --script edits.json
//! ```
//!
//! ## Script format
//!
//! A JSON array of commands tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "select", "id": "title"},
//!   {"op": "drag", "dx": 20, "dy": 10},
//!   {"op": "undo"}
//! ]
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use editor_core::{
    CanvasDocument, Editor, EditorConfig, ElementId, ElementPatch, HandlePosition, InputEvent,
    LayoutDescription, ShapeKind,
};
use serde::Deserialize;

/// Command-line arguments for canvas-edit.
#[derive(Debug, Clone, Parser)]
#[command(name = "canvas-edit")]
#[command(about = "Replay canvas edits headlessly")]
#[command(version)]
pub struct CliArgs {
    /// Layout description to load first (JSON)
    #[arg(long, env = "CANVAS_EDIT_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Edit script to replay (JSON array of commands)
    #[arg(long, env = "CANVAS_EDIT_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Editor configuration (JSON)
    #[arg(long, env = "CANVAS_EDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Width of the available view area, for fit-to-view
    #[arg(long)]
    pub viewport_width: Option<f32>,

    /// Height of the available view area, for fit-to-view
    #[arg(long)]
    pub viewport_height: Option<f32>,

    /// Override the number of undo snapshots kept
    #[arg(long)]
    pub history_capacity: Option<usize>,

    /// Write the final document here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Resolved run configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Layout description path.
    pub layout: Option<PathBuf>,
    /// Edit script path.
    pub script: Option<PathBuf>,
    /// Editor configuration path.
    pub config: Option<PathBuf>,
    /// Available view area, when both dimensions were given.
    pub viewport: Option<(f32, f32)>,
    /// History capacity override.
    pub history_capacity: Option<usize>,
    /// Output path.
    pub output: Option<PathBuf>,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            layout: args.layout,
            script: args.script,
            config: args.config,
            viewport: args.viewport_width.zip(args.viewport_height),
            history_capacity: args.history_capacity,
            output: args.output,
        }
    }
}

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    /// Replace the canvas with an inline layout description.
    Load {
        /// Layout to render.
        layout: LayoutDescription,
    },
    /// Select an element, or clear the selection when `id` is absent.
    Select {
        /// Element to select.
        #[serde(default)]
        id: Option<String>,
    },
    /// Clear the selection.
    Deselect,
    /// Delete the selected element.
    Delete,
    /// Drag the selected element by a display-pixel delta.
    Drag {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// Resize the selected element through a handle.
    Resize {
        /// Handle to pull.
        handle: HandlePosition,
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// Apply a property patch and commit it.
    Update {
        /// Element to patch.
        id: String,
        /// Fields to change.
        patch: ElementPatch,
    },
    /// Replace the content of a text element.
    EditText {
        /// Text element.
        id: String,
        /// New content.
        content: String,
    },
    /// Add a text element.
    AddText,
    /// Add a shape.
    AddShape {
        /// Shape sub-kind.
        #[serde(default)]
        shape: ShapeKind,
    },
    /// Add a placeholder image.
    AddImage,
    /// Raise the selection to the top.
    BringToFront,
    /// Lower the selection to the bottom.
    SendToBack,
    /// Undo the last commit.
    Undo,
    /// Redo the last undone commit.
    Redo,
    /// Set the zoom factor.
    Zoom {
        /// Requested factor.
        factor: f32,
    },
    /// Feed a raw host input event.
    Input {
        /// The event.
        event: InputEvent,
    },
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Final canvas document.
    pub document: CanvasDocument,
    /// Commands that applied cleanly.
    pub applied: usize,
    /// Commands that failed and were skipped.
    pub failed: usize,
}

/// Load the editor configuration named by `config`, applying overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_editor_config(config: &CliConfig) -> anyhow::Result<EditorConfig> {
    let mut editor_config = match &config.config {
        Some(path) => EditorConfig::from_json(&read(path)?)
            .with_context(|| format!("Invalid editor config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if let Some(capacity) = config.history_capacity {
        editor_config.history_capacity = capacity;
    }
    Ok(editor_config)
}

/// Parse an edit script.
///
/// # Errors
///
/// Returns an error if the JSON is not an array of known commands.
pub fn parse_script(json: &str) -> anyhow::Result<Vec<Command>> {
    serde_json::from_str(json).context("Invalid edit script")
}

/// Run one session: load, replay, and return the final document.
///
/// Individual command failures are logged and skipped, the way the
/// browser host ignores a rejected action.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, or the
/// initial layout is rejected.
pub fn run(config: &CliConfig) -> anyhow::Result<RunSummary> {
    let mut editor = Editor::new(load_editor_config(config)?);
    if let Some((width, height)) = config.viewport {
        editor.fit_to_view(width, height);
    }

    if let Some(path) = &config.layout {
        let layout = LayoutDescription::from_json(&read(path)?)
            .with_context(|| format!("Invalid layout {}", path.display()))?;
        let report = editor
            .load_layout(&layout)
            .with_context(|| format!("Layout {} was rejected", path.display()))?;
        for notice in &report.notices {
            tracing::info!("{}", notice.message);
        }
    }

    let commands = match &config.script {
        Some(path) => parse_script(&read(path)?)?,
        None => Vec::new(),
    };

    let (mut applied, mut failed) = (0, 0);
    for (index, command) in commands.iter().enumerate() {
        match apply(&mut editor, command) {
            Ok(()) => applied += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!("Command {index} ({command:?}) failed: {e}");
            }
        }
    }
    tracing::info!("Replayed {applied} commands, {failed} failed");

    Ok(RunSummary {
        document: editor.document(),
        applied,
        failed,
    })
}

/// Apply one command.
///
/// # Errors
///
/// Returns the editor's error for a rejected command.
pub fn apply(editor: &mut Editor, command: &Command) -> editor_core::EditorResult<()> {
    tracing::debug!("Applying {command:?}");
    match command {
        Command::Load { layout } => editor.load_layout(layout).map(|_| ()),
        Command::Select { id } => {
            let id = id.as_deref().map(ElementId::new);
            editor.select(id.as_ref())
        }
        Command::Deselect => {
            editor.deselect();
            Ok(())
        }
        Command::Delete => editor.delete_selected().map(|_| ()),
        Command::Drag { dx, dy } => editor.drag_selected_by(*dx, *dy).map(|_| ()),
        Command::Resize { handle, dx, dy } => editor.resize_selected(*handle, *dx, *dy).map(|_| ()),
        Command::Update { id, patch } => {
            editor.update_element(&ElementId::new(id.as_str()), patch)?;
            editor.commit_edit();
            Ok(())
        }
        Command::EditText { id, content } => {
            editor.begin_text_edit(&ElementId::new(id.as_str()))?;
            editor.commit_text_edit(content).map(|_| ())
        }
        Command::AddText => editor.add_text().map(|_| ()),
        Command::AddShape { shape } => editor.add_shape(*shape).map(|_| ()),
        Command::AddImage => editor.add_image().map(|_| ()),
        Command::BringToFront => editor.bring_to_front().map(|_| ()),
        Command::SendToBack => editor.send_to_back().map(|_| ()),
        Command::Undo => editor.undo().map(|_| ()),
        Command::Redo => editor.redo().map(|_| ()),
        Command::Zoom { factor } => {
            editor.set_zoom(*factor);
            Ok(())
        }
        Command::Input { event } => editor.handle_input(event),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LAYOUT: &str = r#"{
        "canvas": {"width": 400, "height": 300},
        "elements": [
            {"id": "title", "type": "text", "content": "Hello", "x": 20, "y": 20, "width": 200, "height": 40},
            {"id": "box", "type": "shape", "x": 100, "y": 100, "width": 100, "height": 100}
        ]
    }"#;

    fn fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    fn geometry_x(document: &CanvasDocument, id: &str) -> f32 {
        document
            .elements
            .iter()
            .find(|record| record.id.as_str() == id)
            .expect("element")
            .geometry
            .x
    }

    #[test]
    fn cli_args_convert_to_config() {
        let args = CliArgs::parse_from([
            "canvas-edit",
            "--layout",
            "poster.json",
            "--viewport-width",
            "800",
            "--viewport-height",
            "600",
            "--history-capacity",
            "10",
        ]);
        let config = CliConfig::from(args);
        assert_eq!(config.layout, Some(PathBuf::from("poster.json")));
        assert_eq!(config.viewport, Some((800.0, 600.0)));
        assert_eq!(config.history_capacity, Some(10));
        assert!(config.output.is_none());
    }

    #[test]
    fn viewport_needs_both_dimensions() {
        let args = CliArgs::parse_from(["canvas-edit", "--viewport-width", "800"]);
        assert!(CliConfig::from(args).viewport.is_none());
    }

    #[test]
    fn script_parses_tagged_commands() {
        let commands = parse_script(
            r#"[
                {"op": "select", "id": "box"},
                {"op": "resize", "handle": "se", "dx": 10, "dy": 5},
                {"op": "addShape", "shape": "circle"},
                {"op": "input", "event": {"type": "key", "key": "Delete"}},
                {"op": "undo"}
            ]"#,
        )
        .expect("script");
        assert_eq!(commands.len(), 5);
        assert_eq!(
            commands[1],
            Command::Resize {
                handle: HandlePosition::Se,
                dx: 10.0,
                dy: 5.0
            }
        );
        assert!(parse_script(r#"[{"op": "explode"}]"#).is_err());
    }

    #[test]
    fn run_replays_script_and_skips_failures() {
        let layout = fixture(LAYOUT);
        let script = fixture(
            r#"[
                {"op": "select", "id": "box"},
                {"op": "drag", "dx": 30, "dy": 0},
                {"op": "select", "id": "ghost"},
                {"op": "addText"},
                {"op": "undo"}
            ]"#,
        );
        let config = CliConfig {
            layout: Some(layout.path().to_path_buf()),
            script: Some(script.path().to_path_buf()),
            ..CliConfig::default()
        };
        let summary = run(&config).expect("run");
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.document.elements.len(), 2);
        assert!((geometry_x(&summary.document, "box") - 130.0).abs() < 1e-4);
    }

    #[test]
    fn config_file_and_override_apply() {
        let file = fixture(r#"{"historyCapacity": 5, "minElementSize": 30}"#);
        let config = CliConfig {
            config: Some(file.path().to_path_buf()),
            history_capacity: Some(7),
            ..CliConfig::default()
        };
        let editor_config = load_editor_config(&config).expect("config");
        assert_eq!(editor_config.history_capacity, 7);
        assert!((editor_config.min_element_size - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_layout_file_is_an_error() {
        let config = CliConfig {
            layout: Some(PathBuf::from("/definitely/not/here.json")),
            ..CliConfig::default()
        };
        let err = run(&config).expect_err("missing file");
        assert!(err.to_string().contains("Failed to read"));
    }
}
