//! Command-line interface for the shipwright utility
//!
//! Works on markup that a Mermaid renderer already produced: report the
//! connectors it can infer, move a node with its edges attached, and apply
//! the same whole-word rename the interactive label editor performs.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use shipwright::core::logging::init_logging;
use shipwright::{
    format_number, load_scene, move_node, prepare_source, rename_whole_word, BoundingBox,
    EditorConfig, NodeKind, Scene,
};

/// Shipwright - edit rendered Mermaid diagrams
#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Inspect and edit rendered Mermaid SVG without re-running layout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// JSON editor config (thresholds, routing style, theme)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List nodes and the connectors inferred between them
    Inspect {
        /// Rendered SVG (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Move a node and redraw its connectors
    Drag {
        /// Rendered SVG (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Id of the node's group element
        #[arg(long)]
        node: String,

        /// Horizontal offset in graphic units
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dx: f64,

        /// Vertical offset in graphic units
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dy: f64,

        /// Output file for the new SVG (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename a node in diagram source, whole words only
    Rename {
        /// Diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Current name
        #[arg(long)]
        from: String,

        /// New name
        #[arg(long)]
        to: String,

        /// Output file for the rewritten source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the text that would be sent to the renderer
    Prepare {
        /// Diagram source, optionally fenced (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Render id used for cache-busting
        #[arg(long, default_value = "shipwright-0")]
        render_id: String,
    },
}

#[derive(Debug, Serialize)]
struct NodeReport {
    id: String,
    kind: &'static str,
    shape: String,
    #[serde(rename = "box")]
    bbox: BoundingBox,
}

#[derive(Debug, Serialize)]
struct EdgeReport {
    connector: Option<String>,
    source: String,
    target: String,
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct SceneReport {
    nodes: Vec<NodeReport>,
    edges: Vec<EdgeReport>,
}

impl SceneReport {
    fn from_scene(scene: &Scene) -> Self {
        let doc = scene.document();
        let nodes = scene
            .nodes()
            .iter()
            .map(|node| NodeReport {
                id: node.id.clone(),
                kind: kind_name(node.kind),
                shape: node.shape.to_string(),
                bbox: node.current_box(),
            })
            .collect();
        let edges = scene
            .edges()
            .iter()
            .map(|edge| EdgeReport {
                connector: doc.attr(edge.connector, "id").map(str::to_string),
                source: scene.nodes()[edge.source].id.clone(),
                target: scene.nodes()[edge.target].id.clone(),
                label: edge
                    .label
                    .map(|i| doc.text_content(scene.labels()[i].element).trim().to_string())
                    .filter(|text| !text.is_empty()),
            })
            .collect();
        Self { nodes, edges }
    }

    fn to_table(&self) -> String {
        let mut out = format!("Nodes ({}):\n", self.nodes.len());
        for node in &self.nodes {
            out.push_str(&format!(
                "  {}  {} {}  at {},{}  {}x{}\n",
                node.id,
                node.kind,
                node.shape,
                format_number(node.bbox.x),
                format_number(node.bbox.y),
                format_number(node.bbox.width),
                format_number(node.bbox.height),
            ));
        }
        out.push_str(&format!("Connectors ({}):\n", self.edges.len()));
        for edge in &self.edges {
            out.push_str(&format!(
                "  {}  {} -> {}",
                edge.connector.as_deref().unwrap_or("(unnamed)"),
                edge.source,
                edge.target
            ));
            if let Some(label) = &edge.label {
                out.push_str(&format!("  [{}]", label));
            }
            out.push('\n');
        }
        out
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Flowchart => "flowchart",
        NodeKind::Entity => "entity",
    }
}

/// Main CLI application
pub struct ShipwrightApp {
    config: EditorConfig,
}

impl ShipwrightApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // environment variables take precedence over flags
        let log_level = std::env::var("SHIPWRIGHT_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("SHIPWRIGHT_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());
        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Shipwright v{}", env!("CARGO_PKG_VERSION"));
        }

        if let Some(path) = &cli.config {
            self.config = EditorConfig::load(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
        }

        match cli.command {
            Commands::Inspect { input, json } => self.inspect_command(input, json, cli.verbose),
            Commands::Drag {
                input,
                node,
                dx,
                dy,
                output,
            } => self.drag_command(input, &node, dx, dy, output, cli.verbose),
            Commands::Rename {
                input,
                from,
                to,
                output,
            } => self.rename_command(input, &from, &to, output, cli.verbose),
            Commands::Prepare { input, render_id } => {
                self.prepare_command(input, &render_id, cli.verbose)
            }
        }
    }

    fn inspect_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let markup = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", markup.len());
        }

        let scene = load_scene(&markup, &self.config)?;
        let report = SceneReport::from_scene(&scene);
        info!(
            nodes = report.nodes.len(),
            edges = report.edges.len(),
            "Inspected graphic"
        );

        if json {
            self.write_output(None, &serde_json::to_string_pretty(&report)?)
        } else {
            self.write_output(None, &report.to_table())
        }
    }

    fn drag_command(
        &self,
        input: Option<PathBuf>,
        node: &str,
        dx: f64,
        dy: f64,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let markup = self.read_input(input)?;
        let moved = move_node(&markup, node, dx, dy, &self.config)?;
        if verbose {
            eprintln!("Moved {} by ({}, {})", node, format_number(dx), format_number(dy));
        }
        self.write_output(output, &moved)
    }

    fn rename_command(
        &self,
        input: Option<PathBuf>,
        from: &str,
        to: &str,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        if from.trim().is_empty() {
            return Err(anyhow!("--from must not be empty"));
        }
        let source = self.read_input(input)?;
        let renamed = rename_whole_word(&source, from, to.trim());
        if verbose && renamed == source {
            eprintln!("No whole-word occurrence of '{}' found", from);
        }
        self.write_output(output, &renamed)
    }

    fn prepare_command(&self, input: Option<PathBuf>, render_id: &str, verbose: bool) -> Result<()> {
        let source = self.read_input(input)?;
        match prepare_source(&source, render_id) {
            Some(text) => self.write_output(None, &text),
            None => {
                if verbose {
                    eprintln!("Source is empty; the graphic would be cleared");
                }
                Ok(())
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for ShipwrightApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    const SVG: &str = r#"<svg><g class="nodes"><g class="node" id="a" transform="translate(0, 0)"><rect x="-20" y="-10" width="40" height="20"/></g><g class="node" id="b" transform="translate(200, 0)"><rect x="-20" y="-10" width="40" height="20"/></g></g><g class="edgePaths"><path id="e1" d="M20,0 L180,0"/></g><g class="edgeLabels"><g class="edgeLabel" transform="translate(100, 0)"><text>calls</text></g></g></svg>"#;

    #[test]
    fn test_cli_parsing_drag_command() {
        let cli = Cli::try_parse_from([
            "shipwright", "drag", "-i", "in.svg", "--node", "a", "--dx", "-15", "--dy", "2.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Drag {
                input,
                node,
                dx,
                dy,
                output,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "in.svg");
                assert_eq!(node, "a");
                assert_eq!(dx, -15.0);
                assert_eq!(dy, 2.5);
                assert!(output.is_none());
            }
            _ => panic!("Expected Drag command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shipwright", "inspect", "--json", "--log-level", "debug", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Commands::Inspect { json: true, .. }));
    }

    #[test]
    fn test_cli_parsing_prepare_default_render_id() {
        let cli = Cli::try_parse_from(["shipwright", "prepare"]).unwrap();
        match cli.command {
            Commands::Prepare { input, render_id } => {
                assert!(input.is_none());
                assert_eq!(render_id, "shipwright-0");
            }
            _ => panic!("Expected Prepare command"),
        }
    }

    #[test]
    fn test_rename_requires_names() {
        assert!(Cli::try_parse_from(["shipwright", "rename", "--from", "a"]).is_err());
    }

    #[test]
    fn test_scene_report() {
        let scene = load_scene(SVG, &EditorConfig::default()).unwrap();
        let report = SceneReport::from_scene(&scene);
        assert_eq!(report.nodes.len(), 2);
        assert_eq!(report.edges[0].connector.as_deref(), Some("e1"));
        assert_eq!(report.edges[0].label.as_deref(), Some("calls"));

        let table = report.to_table();
        assert!(table.contains("a  flowchart rectangle  at -20,-10  40x20"));
        assert!(table.contains("e1  a -> b  [calls]"));
    }

    #[test]
    fn test_read_and_write_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mmd");
        let output = dir.path().join("out.mmd");
        fs::write(&input, "graph TD\n  api --> admin_api_ui").unwrap();

        let app = ShipwrightApp::new();
        app.rename_command(Some(input), "api", "gateway", Some(output.clone()), false)
            .unwrap();
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "graph TD\n  gateway --> admin_api_ui"
        );
    }

    #[test]
    fn test_missing_input_file() {
        let app = ShipwrightApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/diagram.svg")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
