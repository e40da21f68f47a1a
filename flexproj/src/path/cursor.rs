use flexproj_types::Point2d;

use crate::path::model::PathInstruction;

/// A single traversal step of a [`Path`](crate::path::Path): the
/// instruction together with its control and end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start of a new sub-path.
    MoveTo(Point2d),
    /// Straight segment to the point.
    LineTo(Point2d),
    /// Quadratic bezier: control point, end point.
    QuadTo(Point2d, Point2d),
    /// Cubic bezier: two control points, end point.
    CubicTo(Point2d, Point2d, Point2d),
    /// Closes the current sub-path.
    Close,
}

impl PathSegment {
    /// End point of the segment, if it carries one.
    pub fn end_point(&self) -> Option<Point2d> {
        match self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some(*p),
            PathSegment::QuadTo(_, p) | PathSegment::CubicTo(_, _, p) => Some(*p),
            PathSegment::Close => None,
        }
    }
}

/// Read-only cursor over a path's instruction and coordinate buffers.
#[derive(Debug, Clone)]
pub struct PathCursor<'a> {
    instructions: &'a [PathInstruction],
    coords: &'a [f64],
    instruction_index: usize,
    coord_index: usize,
}

impl<'a> PathCursor<'a> {
    pub(crate) fn new(instructions: &'a [PathInstruction], coords: &'a [f64]) -> Self {
        Self {
            instructions,
            coords,
            instruction_index: 0,
            coord_index: 0,
        }
    }

    fn take_point(&mut self) -> Point2d {
        let p = Point2d::new(self.coords[self.coord_index], self.coords[self.coord_index + 1]);
        self.coord_index += 2;
        p
    }
}

impl Iterator for PathCursor<'_> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let instruction = *self.instructions.get(self.instruction_index)?;
        self.instruction_index += 1;

        Some(match instruction {
            PathInstruction::MoveTo => PathSegment::MoveTo(self.take_point()),
            PathInstruction::LineTo => PathSegment::LineTo(self.take_point()),
            PathInstruction::QuadTo => PathSegment::QuadTo(self.take_point(), self.take_point()),
            PathInstruction::CubicTo => {
                PathSegment::CubicTo(self.take_point(), self.take_point(), self.take_point())
            }
            PathInstruction::Close => PathSegment::Close,
        })
    }
}
