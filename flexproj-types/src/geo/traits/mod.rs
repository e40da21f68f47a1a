//! Traits for geographic points and projections.

pub mod point;
pub mod projection;
