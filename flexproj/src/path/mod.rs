//! Mutable polyline/bezier path geometry.
//!
//! [`Path`] is the unit of vector geometry in the engine: a flat buffer of
//! drawing instructions with a parallel coordinate buffer, traversed
//! read-only through [`PathCursor`] and flattened to pure polylines on
//! demand.

mod cursor;
pub use cursor::{PathCursor, PathSegment};

mod flatten;

mod model;
pub use model::{Path, PathInstruction};
