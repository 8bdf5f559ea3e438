//! Core model of the interactive graphic
//!
//! Everything that does not depend on a particular connector family lives
//! here: the SVG tree, geometry, shape classification, boundary math,
//! connection inference and the drag state machine. The connector-specific
//! reconnection formulas are in [`crate::plugins`].

mod config;
mod drag;
mod error;
mod geometry;
mod inference;
mod intersect;
pub mod logging;
pub mod path_data;
mod scene;
mod shape;
mod svg;
mod types;
mod viewport;

pub use config::*;
pub use drag::*;
pub use error::*;
pub use geometry::*;
pub use inference::*;
pub use intersect::*;
pub use logging::*;
pub use scene::*;
pub use shape::*;
pub use svg::*;
pub use types::*;
pub use viewport::*;
