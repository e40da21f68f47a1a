//! Built-in map projections.

mod equirectangular;
pub use equirectangular::Equirectangular;

mod mercator;
pub use mercator::Mercator;

mod sinusoidal;
pub use sinusoidal::Sinusoidal;

mod robinson;
pub use robinson::Robinson;

mod flex;
pub use flex::FlexProjection;
