//! Coordinate systems: voxel space, the projected plane of a patch, and patch-local cells.

use core::fmt;

use euclid::{Point2D, Point3D, Size2D, Vector2D, point2, point3};

/// Unit-of-measure identifier used with [`euclid`] for whole voxels in the 3D model grid.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug)]
pub enum VoxelUnit {}

/// Unit-of-measure identifier for the 2D plane a patch is projected onto.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug)]
pub enum PlaneUnit {}

/// Unit-of-measure identifier for positions relative to a patch's lower corner, where
/// one unit is one face (one canvas cell).
#[expect(clippy::exhaustive_enums)]
#[derive(Debug)]
pub enum CellUnit {}

/// Position of a voxel.
pub type VoxelPoint = Point3D<i32, VoxelUnit>;

/// Position of a face after projection along a patch's [`Axis`].
pub type PlanePoint = Point2D<i32, PlaneUnit>;

/// Position of a face relative to its patch's lower corner.
pub type LocalPoint = Point2D<i32, CellUnit>;

/// Offset between two [`LocalPoint`]s (or, after unit conversion, two [`PlanePoint`]s).
pub type CellOffset = Vector2D<i32, CellUnit>;

/// Width and height of a patch, in faces.
pub type CellSize = Size2D<u32, CellUnit>;

/// Enumeration of the axes of three-dimensional space; used as the projection axis of a
/// patch (the axis along which all of its faces have the same coordinate).
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in the standard order, [X, Y, Z].
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Convert the axis to a number for indexing 3-element arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the coordinate of `point` along this axis; the “depth” lost by [`Self::project`].
    #[inline]
    pub fn depth_of(self, point: VoxelPoint) -> i32 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }

    /// Drops the coordinate on this axis, keeping the other two in increasing axis order.
    ///
    /// * X projects to (y, z)
    /// * Y projects to (x, z)
    /// * Z projects to (x, y)
    #[inline]
    pub fn project(self, point: VoxelPoint) -> PlanePoint {
        match self {
            Axis::X => point2(point.y, point.z),
            Axis::Y => point2(point.x, point.z),
            Axis::Z => point2(point.x, point.y),
        }
    }

    /// Inverse of [`Self::project`]: reinserts `depth` as the coordinate on this axis.
    #[inline]
    pub fn unproject(self, point: PlanePoint, depth: i32) -> VoxelPoint {
        match self {
            Axis::X => point3(depth, point.x, point.y),
            Axis::Y => point3(point.x, depth, point.y),
            Axis::Z => point3(point.x, point.y, depth),
        }
    }
}

/// Format the axis as one of the strings "x", "y", or "z" (lowercase).
impl fmt::LowerHex for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl From<Axis> for u8 {
    #[inline]
    fn from(value: Axis) -> Self {
        value as u8
    }
}

/// Which way a patch's faces point.
///
/// Well-formed values are `0..=5`, one per side of a voxel. Other values are representable
/// because they come from untyped editor data; they are given the same treatment as `5`
/// wherever a definite answer is needed (see [`TileTransform::resolve`]).
///
/// [`TileTransform::resolve`]: crate::TileTransform::resolve
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Orientation(u8);

impl Orientation {
    /// All six well-formed orientations.
    pub const ALL: [Self; 6] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
    ];

    #[inline]
    #[allow(missing_docs)]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw orientation number.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the index of this orientation in per-orientation arrays, or [`None`] if it is
    /// not one of the six well-formed values.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        if self.0 < 6 {
            Some(self.0 as usize)
        } else {
            None
        }
    }
}

impl From<u8> for Orientation {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhaust::Exhaust as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_drops_axis_coordinate() {
        let p = point3(1, 2, 3);
        assert_eq!(Axis::X.project(p), point2(2, 3));
        assert_eq!(Axis::Y.project(p), point2(1, 3));
        assert_eq!(Axis::Z.project(p), point2(1, 2));
    }

    #[test]
    fn unproject_inverts_project() {
        let p: VoxelPoint = point3(-4, 7, 11);
        for axis in Axis::exhaust() {
            assert_eq!(
                axis.unproject(axis.project(p), axis.depth_of(p)),
                p,
                "{axis:?}"
            );
        }
    }

    #[test]
    fn axis_index_matches_all_order() {
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            assert_eq!(axis.index(), i);
            assert_eq!(u8::from(axis) as usize, i);
        }
        assert_eq!(format!("{:x}", Axis::Y), "y");
    }

    #[test]
    fn orientation_index() {
        assert_eq!(Orientation::new(0).index(), Some(0));
        assert_eq!(Orientation::new(5).index(), Some(5));
        assert_eq!(Orientation::new(6).index(), None);
        assert_eq!(Orientation::new(255).index(), None);
        assert_eq!(Orientation::ALL.len(), 6);
        assert_eq!(Orientation::from(3).to_string(), "3");
    }
}
