//! Input data: [`Face`]s and the [`Patch`]es they are grouped into.

use alloc::vec::Vec;
use core::fmt;

use euclid::vec2;

use crate::{Axis, CellSize, LocalPoint, Orientation, PlanePoint, VoxelPoint};

/// Color data of faces and canvases.
/// The components are sRGB `[R, G, B, A]`.
pub type Texel = [u8; 4];

/// Identifies a painted tile image held by a [`TileStore`](crate::TileStore).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}", self.0)
    }
}

/// A tile painted on one side of a voxel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct FaceTile {
    /// Which tile image to draw.
    pub id: TileId,
    /// Quarter turns chosen by the user; only the value modulo 4 matters.
    pub rotation: u8,
    /// Whether the user mirrored the tile.
    pub flip: bool,
}

impl FaceTile {
    /// A tile with no rotation and no flip.
    pub const fn new(id: TileId) -> Self {
        Self {
            id,
            rotation: 0,
            flip: false,
        }
    }
}

/// One voxel as seen by the rasterizer: its position, its flat color, and the tile (if any)
/// painted on each of its six sides.
#[derive(Clone, Debug, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Face {
    /// Position of the voxel in the model grid.
    pub position: VoxelPoint,
    /// Color drawn where no tile is drawn.
    pub color: Texel,
    /// Tile per side, indexed by [`Orientation::index()`].
    pub tiles: [Option<FaceTile>; 6],
}

impl Face {
    /// Constructs an untextured face.
    pub const fn new(position: VoxelPoint, color: Texel) -> Self {
        Self {
            position,
            color,
            tiles: [None; 6],
        }
    }

    /// Returns this face with `tile` painted on the side facing `orientation`.
    ///
    /// Has no effect if `orientation` is not one of the six well-formed values.
    #[must_use]
    pub fn with_tile(mut self, orientation: Orientation, tile: FaceTile) -> Self {
        if let Some(slot) = orientation.index().and_then(|i| self.tiles.get_mut(i)) {
            *slot = Some(tile);
        }
        self
    }

    /// Returns the tile painted on the side facing `orientation`, if any.
    pub fn tile(&self, orientation: Orientation) -> Option<FaceTile> {
        orientation.index().and_then(|i| self.tiles[i])
    }
}

/// A group of coplanar faces sharing one orientation, to be rendered into one texture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Patch {
    faces: Vec<Face>,
    orientation: Orientation,
    axis: Axis,
    min: PlanePoint,
    size: CellSize,
}

impl Patch {
    /// Constructs a patch.
    ///
    /// `min` and `size` are the bounding box of the faces after projection along `axis`.
    /// The order of `faces` is the order they are drawn in, so it must be stable for the
    /// rendered texture to be.
    pub fn new(
        faces: Vec<Face>,
        orientation: Orientation,
        axis: Axis,
        min: PlanePoint,
        size: CellSize,
    ) -> Self {
        Self {
            faces,
            orientation,
            axis,
            min,
            size,
        }
    }

    /// Constructs a patch whose bounds are the bounding box of `faces`.
    ///
    /// An empty patch gets zero size at the origin.
    pub fn from_faces(faces: Vec<Face>, orientation: Orientation, axis: Axis) -> Self {
        let mut points = faces.iter().map(|face| axis.project(face.position));
        let (min, size) = match points.next() {
            None => (PlanePoint::origin(), CellSize::zero()),
            Some(first) => {
                let (min, max) = points.fold((first, first), |(min, max), p| {
                    (min.min(p), max.max(p))
                });
                let extent = max - min + vec2(1, 1);
                (min, CellSize::new(extent.x as u32, extent.y as u32))
            }
        };
        Self::new(faces, orientation, axis, min, size)
    }

    #[allow(missing_docs)]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[allow(missing_docs)]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[allow(missing_docs)]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Lower corner of the patch in the projected plane.
    pub fn min(&self) -> PlanePoint {
        self.min
    }

    /// Width and height of the patch, in faces.
    pub fn size(&self) -> CellSize {
        self.size
    }

    /// Projects `face` into the plane of this patch, returning both the absolute plane
    /// position and the position relative to [`Self::min()`].
    pub fn locate(&self, face: &Face) -> (PlanePoint, LocalPoint) {
        let plane = self.axis.project(face.position);
        (plane, (plane - self.min).cast_unit().to_point())
    }

    /// Whether `local` is on the outermost ring of cells of this patch.
    pub fn is_on_boundary(&self, local: LocalPoint) -> bool {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        local.x == 0 || local.y == 0 || local.x == w - 1 || local.y == h - 1
    }
}
