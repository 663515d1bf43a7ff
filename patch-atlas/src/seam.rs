//! Border extension: copying the color of a patch's edge faces one cell outward, where
//! the model's hull continues, so that texture filtering at the edge of a patch does not
//! pick up the background color.

use crate::{
    Axis, CellOffset, CellSize, Face, HullAdjacency, LocalPoint, Orientation, PatchCanvas,
    PlanePoint,
};

/// Directions in which an edge face may be extended, in the order they are tried.
/// Each applies only if the face lies on the matching side(s) of the patch.
const OFFSETS: [CellOffset; 8] = [
    CellOffset::new(-1, -1),
    CellOffset::new(1, 1),
    CellOffset::new(-1, 1),
    CellOffset::new(1, -1),
    CellOffset::new(-1, 0),
    CellOffset::new(1, 0),
    CellOffset::new(0, -1),
    CellOffset::new(0, 1),
];

/// Returns the offsets from `local` that point out of a patch of the given `size`:
/// up to two edge directions and, for a corner, the diagonal between them.
///
/// A face in a patch that is only one face wide may be on both opposite edges at once,
/// and gets offsets for both.
pub fn boundary_offsets(local: LocalPoint, size: CellSize) -> impl Iterator<Item = CellOffset> {
    let (w, h) = (size.width as i32, size.height as i32);
    let on_edge = move |d: i32, coord: i32, extent: i32| match d {
        -1 => coord == 0,
        1 => coord == extent - 1,
        _ => true,
    };
    OFFSETS
        .into_iter()
        .filter(move |offset| on_edge(offset.x, local.x, w) && on_edge(offset.y, local.y, h))
}

/// Extends `face`'s color into the neighboring cell `local + offset`, if the hull says
/// there is a visible border at the neighboring voxel position.
///
/// `plane` is the face's position in the projected plane (not relative to the patch), which
/// is combined with `offset` and unprojected at the face's own depth to find the neighbor.
///
/// Returns whether anything was painted. Paints a single pixel on a flat canvas or a
/// whole cell on a tiled canvas.
#[expect(clippy::too_many_arguments)]
pub fn extend_border<H: HullAdjacency + ?Sized>(
    face: &Face,
    plane: PlanePoint,
    axis: Axis,
    orientation: Orientation,
    hull: &H,
    canvas: &mut PatchCanvas,
    local: LocalPoint,
    offset: CellOffset,
) -> bool {
    let neighbor = axis.unproject(plane + offset.cast_unit(), axis.depth_of(face.position));
    if !hull.has_border(neighbor, orientation) {
        return false;
    }
    log::trace!("extending border of {:?} toward {neighbor:?}", face.position);
    canvas.fill_cell(local + offset, face.color)
}
