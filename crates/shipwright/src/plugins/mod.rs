//! Connector families
//!
//! Each family knows how to redraw its connectors once inference has tied
//! them to nodes. Flowchart connectors are straight segments between shape
//! boundaries; entity relationships are routed elbows or curves with a
//! recomputed arrowhead.

pub mod entity;
pub mod flowchart;

pub use entity::*;
pub use flowchart::*;
