//! # Sketch Canvas Replay
//!
//! Headless host for the drawing canvas. Reads a recorded JSON script of
//! input events and commands, drives a [`SketchCanvas`] through it, and
//! writes the final frame to disk.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sketch-replay -- --script strokes.json --output strokes.png
//! ```
//!
//! ## Script format
//!
//! ```json
//! {
//!   "geometry": { "left": 0, "top": 0, "displayed_width": 400, "displayed_height": 300,
//!                 "backing_width": 800, "backing_height": 600 },
//!   "steps": [
//!     { "type": "config", "color": "#ff0000", "width": 4, "tool": "marker" },
//!     { "type": "input", "event": { "type": "Pointer", "data": { "phase": "down", "x": 10, "y": 10 } } },
//!     { "type": "undo" },
//!     { "type": "clear" }
//!   ]
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use sketch_core::{CanvasGeometry, Color, InputEvent, Tool};
use sketch_renderer::{CanvasConfig, ExportConfig, ExportFormat, SketchCanvas, Snapshot};

/// Command-line arguments for sketch-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketch-replay")]
#[command(about = "Replay a recorded drawing script into an image")]
#[command(version)]
pub struct CliArgs {
    /// JSON script of input events and commands
    #[arg(long, env = "SKETCH_SCRIPT")]
    pub script: PathBuf,

    /// Image file to write
    #[arg(long, env = "SKETCH_OUTPUT")]
    pub output: PathBuf,

    /// Output format (png or jpeg); inferred from the output extension if omitted
    #[arg(long, env = "SKETCH_FORMAT", value_parser = parse_format)]
    pub format: Option<ExportFormat>,

    /// Canvas width in pixels
    #[arg(long, env = "SKETCH_WIDTH", default_value = "800")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, env = "SKETCH_HEIGHT", default_value = "600")]
    pub height: u32,

    /// Opaque background colour as hex (#RGB or #RRGGBB)
    #[arg(long, env = "SKETCH_BACKGROUND", default_value = "#ffffff", value_parser = parse_background)]
    pub background: Color,
}

fn parse_format(name: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_name(name).ok_or_else(|| format!("unsupported format: {name}"))
}

fn parse_background(token: &str) -> Result<Color, String> {
    Color::parse(token)
        .and_then(Color::ensure_opaque)
        .map_err(|e| e.to_string())
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path of the JSON script.
    pub script: PathBuf,
    /// Path of the image to write.
    pub output: PathBuf,
    /// Encoding of the written image.
    pub format: ExportFormat,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Canvas background.
    pub background: Color,
}

impl From<CliArgs> for ReplayConfig {
    fn from(args: CliArgs) -> Self {
        let format = args
            .format
            .or_else(|| format_for_path(&args.output))
            .unwrap_or_default();
        Self {
            script: args.script,
            output: args.output,
            format,
            width: args.width,
            height: args.height,
            background: args.background,
        }
    }
}

fn format_for_path(path: &Path) -> Option<ExportFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_name)
}

/// A recorded drawing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Element layout used to map event coordinates; identity if absent.
    #[serde(default)]
    pub geometry: Option<CanvasGeometry>,
    /// Steps applied in order.
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse replay script")
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// One step of a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplayStep {
    /// Change tool settings; omitted fields keep their current value.
    Config {
        /// Ink colour.
        #[serde(default)]
        color: Option<Color>,
        /// Base stroke width.
        #[serde(default)]
        width: Option<f32>,
        /// Drawing tool.
        #[serde(default)]
        tool: Option<Tool>,
        /// Canvas background.
        #[serde(default)]
        background: Option<Color>,
    },
    /// Feed one input event.
    Input {
        /// The pointer or touch event.
        event: InputEvent,
    },
    /// Remove the most recent stroke.
    Undo,
    /// Remove every stroke.
    Clear,
}

/// Result of a replay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Whether the final canvas shows any mark.
    pub has_content: bool,
    /// Completed strokes in the final log.
    pub stroke_count: usize,
    /// Encoding of the final image.
    pub format: ExportFormat,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Encoded image size in bytes.
    pub bytes: usize,
}

/// Drive a canvas through `script` and return the final frame.
///
/// # Errors
///
/// Returns an error if the canvas cannot be created, a config step is
/// invalid, or a frame cannot be encoded.
pub fn replay(
    config: &ReplayConfig,
    script: &ReplayScript,
) -> anyhow::Result<(ReplaySummary, Snapshot)> {
    let canvas_config = CanvasConfig {
        width: config.width,
        height: config.height,
        background: config.background,
        export: ExportConfig {
            format: config.format,
            matte: config.background,
            ..ExportConfig::default()
        },
        ..CanvasConfig::default()
    };
    let mut canvas =
        SketchCanvas::with_config(canvas_config).context("Failed to create canvas")?;

    if let Some(geometry) = script.geometry {
        canvas
            .set_geometry(geometry)
            .context("Failed to apply script geometry")?;
    }

    for (index, step) in script.steps.iter().enumerate() {
        apply_step(&mut canvas, step).with_context(|| format!("Step {index} failed"))?;
    }

    let snapshot = match canvas.latest_frame() {
        Some(frame) => frame.snapshot.clone(),
        None => canvas.snapshot()?,
    };
    let summary = ReplaySummary {
        has_content: canvas.has_content(),
        stroke_count: canvas.session().stroke_count(),
        format: snapshot.format,
        width: snapshot.width,
        height: snapshot.height,
        bytes: snapshot.len(),
    };
    tracing::debug!(
        "Replayed {} steps: {} strokes",
        script.steps.len(),
        summary.stroke_count
    );
    Ok((summary, snapshot))
}

fn apply_step(canvas: &mut SketchCanvas, step: &ReplayStep) -> anyhow::Result<()> {
    match step {
        ReplayStep::Config {
            color,
            width,
            tool,
            background,
        } => {
            let mut tool_config = *canvas.session().tool_config();
            if let Some(color) = color {
                tool_config.color = *color;
            }
            if let Some(width) = width {
                tool_config.width = *width;
            }
            if let Some(tool) = tool {
                tool_config.tool = *tool;
            }
            canvas.set_tool_config(tool_config)?;
            if let Some(background) = background {
                canvas.set_background(*background)?;
            }
        }
        ReplayStep::Input { event } => {
            let transition = canvas.handle_event(event)?;
            tracing::trace!("Input {:?}: {:?}", event.action(), transition);
        }
        ReplayStep::Undo => {
            if !canvas.undo()?.is_changed() {
                tracing::debug!("Undo ignored");
            }
        }
        ReplayStep::Clear => {
            let _ = canvas.clear()?;
        }
    }
    Ok(())
}

/// Load the configured script, replay it, and write the image.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or replayed, or the
/// output cannot be written.
pub fn run(config: &ReplayConfig) -> anyhow::Result<ReplaySummary> {
    let script = ReplayScript::load(&config.script)?;
    let (summary, snapshot) = replay(config, &script)?;
    std::fs::write(&config.output, &snapshot.bytes)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    tracing::info!(
        "Wrote {} ({} bytes, {})",
        config.output.display(),
        summary.bytes,
        snapshot.format.mime_type()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::PointerPhase;

    const SCRIPT: &str = r##"{
        "steps": [
            { "type": "config", "color": "#ff0000", "width": 6, "tool": "pen" },
            { "type": "input", "event": { "type": "Pointer", "data": { "phase": "down", "x": 10, "y": 10 } } },
            { "type": "input", "event": { "type": "Pointer", "data": { "phase": "move", "x": 50, "y": 10 } } },
            { "type": "input", "event": { "type": "Pointer", "data": { "phase": "up", "x": 50, "y": 10 } } },
            { "type": "config", "tool": "marker" },
            { "type": "input", "event": { "type": "Touch", "data": { "phase": "start", "touches": [ { "id": 0, "x": 10, "y": 40 } ] } } },
            { "type": "input", "event": { "type": "Touch", "data": { "phase": "move", "touches": [ { "id": 0, "x": 50, "y": 40 } ] } } },
            { "type": "input", "event": { "type": "Touch", "data": { "phase": "end" } } },
            { "type": "undo" }
        ]
    }"##;

    fn config(output: PathBuf, format: ExportFormat) -> ReplayConfig {
        ReplayConfig {
            script: PathBuf::from("unused.json"),
            output,
            format,
            width: 64,
            height: 64,
            background: Color::WHITE,
        }
    }

    #[test]
    fn test_parse_script_steps() {
        let script = ReplayScript::from_json(SCRIPT).expect("parse");
        assert!(script.geometry.is_none());
        assert_eq!(script.steps.len(), 9);
        assert_eq!(
            script.steps[1],
            ReplayStep::Input {
                event: InputEvent::pointer(PointerPhase::Down, 10.0, 10.0)
            }
        );
        assert_eq!(script.steps[8], ReplayStep::Undo);
    }

    #[test]
    fn test_replay_applies_steps_in_order() {
        let script = ReplayScript::from_json(SCRIPT).expect("parse");
        let (summary, snapshot) =
            replay(&config(PathBuf::from("out.png"), ExportFormat::Png), &script).expect("replay");
        assert!(summary.has_content);
        assert_eq!(summary.stroke_count, 1);
        assert_eq!((summary.width, summary.height), (64, 64));
        assert_eq!(summary.bytes, snapshot.len());
        assert_eq!(&snapshot.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_empty_script_is_blank() {
        let (summary, _) = replay(
            &config(PathBuf::from("out.png"), ExportFormat::Png),
            &ReplayScript::default(),
        )
        .expect("replay");
        assert!(!summary.has_content);
        assert_eq!(summary.stroke_count, 0);
    }

    #[test]
    fn test_invalid_config_step_fails() {
        let script = ReplayScript::from_json(r#"{"steps":[{"type":"config","width":0}]}"#)
            .expect("parse");
        let err = replay(&config(PathBuf::from("out.png"), ExportFormat::Png), &script)
            .expect_err("zero width rejected");
        assert!(err.to_string().contains("Step 0"));
    }

    #[test]
    fn test_unknown_step_type_rejected() {
        assert!(ReplayScript::from_json(r#"{"steps":[{"type":"redo"}]}"#).is_err());
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script_path = dir.path().join("script.json");
        std::fs::write(&script_path, SCRIPT).expect("write script");

        let mut config = config(dir.path().join("out.jpg"), ExportFormat::Jpeg);
        config.script = script_path;
        let summary = run(&config).expect("run");

        let written = std::fs::read(&config.output).expect("read output");
        assert_eq!(written.len(), summary.bytes);
        assert_eq!(&written[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_cli_args_infer_format_from_extension() {
        let args = CliArgs::try_parse_from([
            "sketch-replay",
            "--script",
            "in.json",
            "--output",
            "out.jpeg",
            "--background",
            "#203040",
        ])
        .expect("args");
        let config = ReplayConfig::from(args);
        assert_eq!(config.format, ExportFormat::Jpeg);
        assert_eq!(config.background, Color::rgb(0x20, 0x30, 0x40));
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn test_cli_args_explicit_format_wins() {
        let args = CliArgs::try_parse_from([
            "sketch-replay",
            "--script",
            "in.json",
            "--output",
            "out.jpg",
            "--format",
            "png",
        ])
        .expect("args");
        assert_eq!(ReplayConfig::from(args).format, ExportFormat::Png);
    }

    #[test]
    fn test_cli_args_reject_translucent_background() {
        for token in ["transparent", "#ffffff80"] {
            let result = CliArgs::try_parse_from([
                "sketch-replay",
                "--script",
                "in.json",
                "--output",
                "out.png",
                "--background",
                token,
            ]);
            assert!(result.is_err(), "{token} accepted");
        }
    }

    #[test]
    fn test_translucent_background_step_fails() {
        let script = ReplayScript::from_json(
            r##"{"steps":[{"type":"config","background":"#00000000"}]}"##,
        )
        .expect("parse");
        assert!(replay(&config(PathBuf::from("out.png"), ExportFormat::Png), &script).is_err());
    }

    #[test]
    fn test_cli_args_reject_bad_background() {
        let result = CliArgs::try_parse_from([
            "sketch-replay",
            "--script",
            "in.json",
            "--output",
            "out.png",
            "--background",
            "teal",
        ]);
        assert!(result.is_err());
    }
}
