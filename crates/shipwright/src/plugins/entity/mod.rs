//! Entity relationship connectors
//!
//! Entities are boxes joined by routed lines that leave and enter through
//! the facing edges. The arrowhead at the target end is rebuilt along the
//! final segment after every move.

use crate::core::{DragController, DragFlag, EditorConfig};

mod routing;

pub use routing::*;

/// Drag controller for entity boxes
pub type EntityDrag = DragController<EntityRouter>;

/// Build the entity drag controller from editor configuration
pub fn entity_drag(config: &EditorConfig, flag: DragFlag) -> EntityDrag {
    DragController::new(EntityRouter::from_config(config), flag)
}
