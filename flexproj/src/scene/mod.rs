//! Owned tree of geographic objects.
//!
//! The scene graph is a tree of [`GeoObject`]s. Interior nodes are
//! [`GeoSet`]s which exclusively own their children; back-references from
//! child to parent are non-owning [`ObjectId`]s. The set of node variants
//! is the closed union [`GeoObjectKind`], matched exhaustively at every
//! dispatch site.
//!
//! All coordinates of unprojected scene geometry are longitude/latitude
//! in degrees (x = longitude); the projection pipeline produces a second
//! tree in planar map units with the same structure.

pub mod event;
pub use event::{ChangeBatch, ChangeBroadcaster, SceneChange};

mod document;
pub use document::MapDocument;

mod object;
pub use object::{GeoObject, GeoObjectKind, ObjectId};

mod set;
pub use set::GeoSet;

mod path;
pub use path::GeoPath;

mod point;
pub use point::GeoPoint;

mod text;
pub use text::GeoText;

pub mod symbol;
pub use symbol::{FontSymbol, PointSymbol, VectorSymbol};
