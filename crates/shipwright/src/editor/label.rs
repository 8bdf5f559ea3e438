//! In-place rename of a node's display text

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, info};

use super::rename::rename_whole_word;
use crate::core::{ElementId, LabelEditorConfig, Point, Scene, SvgDocument, Viewport};

const LABEL_CLASSES: &[&str] = &["nodeLabel", "label", "entityLabel"];

/// Text input shown over the node being renamed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOverlay {
    pub node_id: String,
    pub original: String,
    /// Current contents of the input
    pub text: String,
    /// Screen position of the node's top-left corner
    pub position: Point,
    /// Selected character range; the whole text when opened
    pub selection: Range<usize>,
    #[serde(skip)]
    opened_at: u64,
}

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKey {
    Enter,
    Escape,
    Other,
}

/// Result of closing the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum LabelOutcome {
    /// Source rewritten with every whole-word occurrence replaced
    Committed {
        original: String,
        replacement: String,
        source: String,
    },
    /// Closed with empty or identical text
    Unchanged,
    /// Closed with Escape
    Cancelled,
}

/// Idle/editing state machine; at most one overlay is open
#[derive(Debug, Clone)]
pub struct LabelEditor {
    blur_grace_ms: u64,
    overlay: Option<LabelOverlay>,
}

impl Default for LabelEditor {
    fn default() -> Self {
        Self::from_config(&LabelEditorConfig::default())
    }
}

impl LabelEditor {
    pub fn from_config(config: &LabelEditorConfig) -> Self {
        Self {
            blur_grace_ms: config.blur_grace_ms,
            overlay: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay(&self) -> Option<&LabelOverlay> {
        self.overlay.as_ref()
    }

    /// Open the overlay on node `index` (double-click)
    ///
    /// Ignored while another overlay is open.
    pub fn begin(
        &mut self,
        scene: &Scene,
        index: usize,
        viewport: &Viewport,
        now_ms: u64,
    ) -> Option<&LabelOverlay> {
        if self.overlay.is_some() {
            debug!("Label edit already open");
            return None;
        }
        let node = scene.node(index)?;
        let text = display_text(scene.document(), node.element);
        let current = node.current_box();
        let position = viewport.to_screen(Point::new(current.x, current.y));

        info!(node = %node.id, text = %text, "Label edit started");
        self.overlay = Some(LabelOverlay {
            node_id: node.id.clone(),
            original: text.clone(),
            selection: 0..text.chars().count(),
            text,
            position,
            opened_at: now_ms,
        });
        self.overlay.as_ref()
    }

    pub fn input(&mut self, text: impl Into<String>) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.text = text.into();
            let end = overlay.text.chars().count();
            overlay.selection = end..end;
        }
    }

    /// Enter commits, Escape cancels, anything else is typing
    pub fn key(&mut self, key: LabelKey, source: &str) -> Option<LabelOutcome> {
        match key {
            LabelKey::Enter => self.commit(source),
            LabelKey::Escape => self.cancel(),
            LabelKey::Other => None,
        }
    }

    /// Focus left the input; commits unless still inside the grace period
    pub fn blur(&mut self, source: &str, now_ms: u64) -> Option<LabelOutcome> {
        let opened_at = self.overlay.as_ref()?.opened_at;
        if now_ms.saturating_sub(opened_at) < self.blur_grace_ms {
            debug!("Blur within grace period ignored");
            return None;
        }
        self.commit(source)
    }

    pub fn commit(&mut self, source: &str) -> Option<LabelOutcome> {
        let overlay = self.overlay.take()?;
        let replacement = overlay.text.trim();
        if replacement.is_empty() || replacement == overlay.original {
            return Some(LabelOutcome::Unchanged);
        }
        info!(from = %overlay.original, to = %replacement, "Label renamed");
        Some(LabelOutcome::Committed {
            source: rename_whole_word(source, &overlay.original, replacement),
            replacement: replacement.to_string(),
            original: overlay.original,
        })
    }

    pub fn cancel(&mut self) -> Option<LabelOutcome> {
        self.overlay.take().map(|_| LabelOutcome::Cancelled)
    }
}

/// First non-empty of: a `title` element, a label element, any text
pub fn display_text(document: &SvgDocument, node: ElementId) -> String {
    let descendants = document.descendants(node);

    let titled = descendants
        .iter()
        .filter(|&&id| document.name(id) == "title")
        .map(|&id| document.text_content(id).trim().to_string())
        .find(|t| !t.is_empty());
    if let Some(text) = titled {
        return text;
    }

    let labelled = descendants
        .iter()
        .filter(|&&id| LABEL_CLASSES.iter().any(|c| document.has_class(id, c)))
        .map(|&id| document.text_content(id).trim().to_string())
        .find(|t| !t.is_empty());
    if let Some(text) = labelled {
        return text;
    }

    document.text_content(node).trim().to_string()
}
