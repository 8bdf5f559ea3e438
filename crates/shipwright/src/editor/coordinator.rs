//! Unified undo/redo over the text and visual tracks

use serde::Serialize;
use tracing::{debug, info};

use super::history::{HistoryStack, SnapshotHistory};
use crate::core::VisualSnapshot;

/// Which log the most recent undoable action went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Text,
    Visual,
}

/// What the editor must do to carry out an undo or redo
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// Install this markup as the live graphic without rendering
    RestoreSnapshot(VisualSnapshot),
    /// Replace the source text (and re-render) without recording it
    ApplyText(String),
    None,
}

/// Two independent tracks behind one undo/redo pair
#[derive(Debug, Clone)]
pub struct HistoryCoordinator {
    text: HistoryStack<String>,
    visual: SnapshotHistory,
    active: Track,
}

impl HistoryCoordinator {
    pub fn new(initial_text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: HistoryStack::new(initial_text.into(), limit),
            visual: SnapshotHistory::new(limit),
            active: Track::Text,
        }
    }

    pub fn active_track(&self) -> Track {
        self.active
    }

    pub fn text(&self) -> &HistoryStack<String> {
        &self.text
    }

    pub fn visual(&self) -> &SnapshotHistory {
        &self.visual
    }

    pub fn can_undo(&self) -> bool {
        self.text.can_undo() || self.visual.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.text.can_redo() || self.visual.can_redo()
    }

    /// Record a text edit
    ///
    /// A real change also drops pending visual redos: they were captured
    /// against a graphic rendered from older text.
    pub fn record_text(&mut self, text: impl Into<String>) -> bool {
        if !self.text.set_value(text.into()) {
            return false;
        }
        self.visual.clear_future();
        self.active = Track::Text;
        true
    }

    /// Record the pre-change snapshot of a visual edit (drag start)
    pub fn record_visual(&mut self, snapshot: VisualSnapshot) -> bool {
        let pushed = self.visual.push_snapshot(snapshot);
        if pushed {
            self.active = Track::Visual;
        }
        pushed
    }

    /// Undo the most relevant action
    ///
    /// `capture` is called only when the visual track is about to be popped,
    /// to save the live graphic for redo. It returns `None` when there is no
    /// live graphic; the visual track is then left untouched.
    pub fn undo(&mut self, capture: impl FnOnce() -> Option<VisualSnapshot>) -> HistoryAction {
        if self.active == Track::Visual && self.visual.can_undo() {
            let Some(current) = capture() else {
                debug!("No live graphic, visual undo skipped");
                return self.text_undo().unwrap_or(HistoryAction::None);
            };
            let action = self.visual_undo(current);
            if !self.visual.can_undo() && self.text.can_undo() {
                self.active = Track::Text;
            }
            return action;
        }

        if let Some(action) = self.text_undo() {
            return action;
        }

        if self.visual.can_undo() {
            // fallback while the marker still says text
            if let Some(current) = capture() {
                self.active = Track::Visual;
                return self.visual_undo(current);
            }
            debug!("No live graphic, visual undo skipped");
            return HistoryAction::None;
        }

        debug!("Nothing to undo");
        HistoryAction::None
    }

    /// Redo, preferring the visual track
    ///
    /// `capture` behaves as for [`undo`](Self::undo).
    pub fn redo(&mut self, capture: impl FnOnce() -> Option<VisualSnapshot>) -> HistoryAction {
        if self.visual.can_redo() {
            match capture() {
                Some(current) => {
                    if let Some(next) = self.visual.redo(current) {
                        self.active = Track::Visual;
                        info!(track = "visual", "Redo");
                        return HistoryAction::RestoreSnapshot(next);
                    }
                }
                None => debug!("No live graphic, visual redo skipped"),
            }
        }

        if let Some(text) = self.text.redo() {
            let text = text.clone();
            self.active = Track::Text;
            info!(track = "text", "Redo");
            return HistoryAction::ApplyText(text);
        }

        debug!("Nothing to redo");
        HistoryAction::None
    }

    /// Start over for a newly opened document
    pub fn reset(&mut self, initial_text: impl Into<String>) {
        self.text.reset(initial_text.into());
        self.visual.reset();
        self.active = Track::Text;
    }

    fn text_undo(&mut self) -> Option<HistoryAction> {
        let text = self.text.undo()?.clone();
        self.active = Track::Text;
        info!(track = "text", "Undo");
        Some(HistoryAction::ApplyText(text))
    }

    fn visual_undo(&mut self, current: VisualSnapshot) -> HistoryAction {
        match self.visual.undo(current) {
            Some(previous) => {
                info!(track = "visual", "Undo");
                HistoryAction::RestoreSnapshot(previous)
            }
            None => HistoryAction::None,
        }
    }
}
