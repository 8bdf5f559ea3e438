//! Flowchart connectors
//!
//! Nodes are classified into rectangles, diamonds and circles; connectors
//! are redrawn as straight segments between their boundaries.

use crate::core::{DragController, DragFlag, EditorConfig};

mod reconnect;

pub use reconnect::*;

/// Drag controller for flowchart nodes
pub type FlowchartDrag = DragController<StraightReconnector>;

/// Build the flowchart drag controller from editor configuration
pub fn flowchart_drag(config: &EditorConfig, flag: DragFlag) -> FlowchartDrag {
    DragController::new(StraightReconnector::from_config(config), flag)
}
